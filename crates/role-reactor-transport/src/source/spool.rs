// crates/role-reactor-transport/src/source/spool.rs
// ============================================================================
// Module: Spool Queue Source
// Description: Durable directory-spool command queue.
// Purpose: Persist queued commands as files that survive process restarts.
// Dependencies: role-reactor-core, cap-std, std
// ============================================================================

//! ## Overview
//! [`SpoolQueue`] stores one message per file inside a sandboxed spool
//! directory. Files are served oldest-first by name; the receipt handle is
//! the file name and deletion removes the file, so undeleted messages are
//! redelivered naturally after a crash or fault.
//! Invariants:
//! - File names are generated monotonically and never reused within a run.
//! - Receipt handles are validated as plain file names before deletion.
//! - Directory access is capability-scoped; the queue never escapes the
//!   spool directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use role_reactor_core::QueueDelivery;
use role_reactor_core::QueueError;
use role_reactor_core::QueueSource;
use role_reactor_core::ReceiptHandle;

use crate::source::EnqueueError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix for spooled message files.
const MESSAGE_PREFIX: &str = "msg-";

/// Suffix for spooled message files.
const MESSAGE_SUFFIX: &str = ".json";

/// Sleep interval between directory scans during a long poll.
const SCAN_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// SECTION: Spool Queue
// ============================================================================

/// Durable queue source over a directory of message files.
///
/// # Invariants
/// - Messages are served in lexicographic file-name order (oldest first).
pub struct SpoolQueue {
    /// Capability-scoped spool directory.
    dir: Dir,
    /// Next sequence number for enqueued file names.
    next_seq: AtomicU64,
}

impl SpoolQueue {
    /// Opens a spool queue rooted at `path`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Receive`] when the directory cannot be created
    /// or opened, or when existing spool entries cannot be listed.
    pub fn open(path: &Path) -> Result<Self, QueueError> {
        std::fs::create_dir_all(path)
            .map_err(|err| QueueError::Receive(format!("spool create failed: {err}")))?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| QueueError::Receive(format!("spool open failed: {err}")))?;
        let queue = Self {
            dir,
            next_seq: AtomicU64::new(1),
        };
        let highest = queue.message_names()?.into_iter().next_back();
        if let Some(name) = highest
            && let Some(seq) = parse_sequence(&name)
        {
            queue.next_seq.store(seq + 1, Ordering::Relaxed);
        }
        Ok(queue)
    }

    /// Enqueues one raw message body as a new spool file.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Io`] when the file cannot be written.
    pub fn enqueue(&self, body: &str) -> Result<(), EnqueueError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let name = format!("{MESSAGE_PREFIX}{seq:016}{MESSAGE_SUFFIX}");
        self.dir.write(&name, body).map_err(|err| EnqueueError::Io(err.to_string()))
    }

    /// Lists spooled message file names in lexicographic order.
    fn message_names(&self) -> Result<Vec<String>, QueueError> {
        let entries = self
            .dir
            .entries()
            .map_err(|err| QueueError::Receive(format!("spool scan failed: {err}")))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|err| QueueError::Receive(format!("spool scan failed: {err}")))?;
            if let Ok(name) = entry.file_name().into_string()
                && name.starts_with(MESSAGE_PREFIX)
                && name.ends_with(MESSAGE_SUFFIX)
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads the oldest spooled message, if any.
    fn oldest(&self) -> Result<Option<QueueDelivery>, QueueError> {
        let Some(name) = self.message_names()?.into_iter().next() else {
            return Ok(None);
        };
        let body = self
            .dir
            .read_to_string(&name)
            .map_err(|err| QueueError::Receive(format!("spool read failed: {err}")))?;
        Ok(Some(QueueDelivery {
            body,
            receipt: Some(ReceiptHandle::new(name)),
        }))
    }
}

impl QueueSource for SpoolQueue {
    fn receive(&self, max_wait: Duration) -> Result<Option<QueueDelivery>, QueueError> {
        let deadline = Instant::now() + max_wait;
        loop {
            if let Some(delivery) = self.oldest()? {
                return Ok(Some(delivery));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(SCAN_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let name = receipt.as_str();
        if !is_plain_message_name(name) {
            return Err(QueueError::Delete(format!("invalid receipt handle {name}")));
        }
        self.dir
            .remove_file(name)
            .map_err(|err| QueueError::Delete(format!("spool delete failed: {err}")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the receipt names a spool file without path structure.
fn is_plain_message_name(name: &str) -> bool {
    name.starts_with(MESSAGE_PREFIX)
        && name.ends_with(MESSAGE_SUFFIX)
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

/// Parses the sequence number out of a spool file name.
fn parse_sequence(name: &str) -> Option<u64> {
    name.strip_prefix(MESSAGE_PREFIX)?.strip_suffix(MESSAGE_SUFFIX)?.parse().ok()
}
