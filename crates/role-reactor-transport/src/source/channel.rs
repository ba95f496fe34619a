// crates/role-reactor-transport/src/source/channel.rs
// ============================================================================
// Module: Channel Queue Source
// Description: In-process command queue over a standard mpsc channel.
// Purpose: Feed the reactor from embedding hosts and tests.
// Dependencies: role-reactor-core, std
// ============================================================================

//! ## Overview
//! [`ChannelQueue`] pairs an in-process sender with a [`QueueSource`]. One
//! delivery is held in flight at a time and re-served on every receive until
//! it is deleted, mirroring the redelivery behavior of durable queues.
//! Invariants:
//! - At most one in-flight delivery exists; the loop is strictly sequential.
//! - Deleting a receipt that is not in flight fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use role_reactor_core::QueueDelivery;
use role_reactor_core::QueueError;
use role_reactor_core::QueueSource;
use role_reactor_core::ReceiptHandle;

use crate::source::EnqueueError;

// ============================================================================
// SECTION: Sender
// ============================================================================

/// Producer handle for a [`ChannelQueue`].
#[derive(Debug, Clone)]
pub struct ChannelQueueSender {
    /// Underlying channel sender.
    tx: mpsc::Sender<String>,
}

impl ChannelQueueSender {
    /// Enqueues one raw message body.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Closed`] when the consumer side is gone.
    pub fn send(&self, body: impl Into<String>) -> Result<(), EnqueueError> {
        self.tx
            .send(body.into())
            .map_err(|_| EnqueueError::Closed("channel queue receiver dropped".to_string()))
    }
}

// ============================================================================
// SECTION: Channel Queue
// ============================================================================

/// One in-flight delivery awaiting acknowledgment.
#[derive(Debug, Clone)]
struct InFlight {
    /// Raw message body.
    body: String,
    /// Receipt handle issued for this delivery.
    receipt: String,
}

/// In-process queue source backed by a standard mpsc channel.
///
/// # Invariants
/// - Undeleted deliveries are re-served before new messages are drawn.
pub struct ChannelQueue {
    /// Consumer side of the channel.
    rx: Mutex<mpsc::Receiver<String>>,
    /// Delivery currently awaiting deletion.
    in_flight: Mutex<Option<InFlight>>,
    /// Monotonic counter for receipt handles.
    counter: AtomicU64,
}

impl ChannelQueue {
    /// Creates a connected sender/source pair.
    #[must_use]
    pub fn pair() -> (ChannelQueueSender, Self) {
        let (tx, rx) = mpsc::channel();
        (
            ChannelQueueSender {
                tx,
            },
            Self {
                rx: Mutex::new(rx),
                in_flight: Mutex::new(None),
                counter: AtomicU64::new(0),
            },
        )
    }

    /// Issues the next receipt handle.
    fn next_receipt(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("chan-{seq}")
    }

    /// Locks the in-flight slot, mapping poisoning to a queue error.
    fn in_flight_slot(&self) -> Result<std::sync::MutexGuard<'_, Option<InFlight>>, QueueError> {
        self.in_flight
            .lock()
            .map_err(|_| QueueError::Receive("channel queue state poisoned".to_string()))
    }
}

impl QueueSource for ChannelQueue {
    fn receive(&self, max_wait: Duration) -> Result<Option<QueueDelivery>, QueueError> {
        let mut slot = self.in_flight_slot()?;
        if let Some(in_flight) = slot.as_ref() {
            return Ok(Some(QueueDelivery {
                body: in_flight.body.clone(),
                receipt: Some(ReceiptHandle::new(in_flight.receipt.clone())),
            }));
        }
        let rx = self
            .rx
            .lock()
            .map_err(|_| QueueError::Receive("channel queue state poisoned".to_string()))?;
        match rx.recv_timeout(max_wait) {
            Ok(body) => {
                let receipt = self.next_receipt();
                *slot = Some(InFlight {
                    body: body.clone(),
                    receipt: receipt.clone(),
                });
                Ok(Some(QueueDelivery {
                    body,
                    receipt: Some(ReceiptHandle::new(receipt)),
                }))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(QueueError::Receive("channel queue sender dropped".to_string()))
            }
        }
    }

    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut slot = self
            .in_flight
            .lock()
            .map_err(|_| QueueError::Delete("channel queue state poisoned".to_string()))?;
        match slot.as_ref() {
            Some(in_flight) if in_flight.receipt == receipt.as_str() => {
                *slot = None;
                Ok(())
            }
            _ => Err(QueueError::Delete(format!("unknown receipt handle {}", receipt.as_str()))),
        }
    }
}
