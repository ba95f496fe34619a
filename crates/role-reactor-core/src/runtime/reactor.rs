// crates/role-reactor-core/src/runtime/reactor.rs
// ============================================================================
// Module: Reactor Loop
// Description: Receive/decode/validate/dispatch/respond/acknowledge cycle.
// Purpose: Drive queued commands through the dispatch table, one at a time.
// Dependencies: crate::core, crate::interfaces, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`Reactor`] owns the long-running control loop. Each cycle walks the
//! states Idle → Receiving → Decoding → Validating → Dispatching →
//! Responding → Acknowledging → Idle.
//! Invariants:
//! - One message in flight at a time; strictly sequential dispatch.
//! - Exactly one notification per addressable message, success or failure.
//! - Deliveries are acknowledged iff a receipt handle exists, regardless of
//!   dispatch outcome; semantically invalid commands are never retried.
//! - Infrastructure faults abort the cycle before acknowledgment, so the
//!   transport redelivers (at-least-once).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::core::message::CommandMessage;
use crate::core::message::decode_body;
use crate::core::outcome::DispatchOutcome;
use crate::core::outcome::Notification;
use crate::core::outcome::ResponseAddress;
use crate::interfaces::Clock;
use crate::interfaces::NotifyError;
use crate::interfaces::NotifySink;
use crate::interfaces::QueueError;
use crate::interfaces::QueueSource;
use crate::interfaces::RollbackEngine;
use crate::interfaces::RollbackEngineError;
use crate::interfaces::RoleStore;
use crate::interfaces::RoleStoreError;
use crate::runtime::handlers;
use crate::runtime::handlers::DispatchConfig;
use crate::runtime::handlers::HandlerDeps;
use crate::runtime::handlers::HandlerFault;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bound for one long-poll receive call.
pub const DEFAULT_POLL_WAIT: Duration = Duration::from_secs(20);

// ============================================================================
// SECTION: Reactor Errors
// ============================================================================

/// Infrastructure faults surfaced by a reactor cycle.
///
/// # Invariants
/// - Business-rule and validation failures never appear here; they are
///   dispatch outcomes.
#[derive(Debug, Error)]
pub enum ReactorError {
    /// Queue transport fault.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// Notification transport fault.
    #[error(transparent)]
    Notify(#[from] NotifyError),
    /// Role store fault.
    #[error(transparent)]
    Store(#[from] RoleStoreError),
    /// Rollback engine fault.
    #[error(transparent)]
    Rollback(#[from] RollbackEngineError),
}

impl From<HandlerFault> for ReactorError {
    fn from(fault: HandlerFault) -> Self {
        match fault {
            HandlerFault::Store(err) => Self::Store(err),
            HandlerFault::Rollback(err) => Self::Rollback(err),
        }
    }
}

/// Errors returned when building a reactor.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ReactorBuildError {
    /// Reactor is missing the role store.
    #[error("reactor store is not configured")]
    MissingStore,
    /// Reactor is missing the queue source.
    #[error("reactor queue source is not configured")]
    MissingSource,
    /// Reactor is missing the notify sink.
    #[error("reactor notify sink is not configured")]
    MissingSink,
    /// Reactor is missing the rollback engine.
    #[error("reactor rollback engine is not configured")]
    MissingRollback,
    /// Reactor is missing the clock.
    #[error("reactor clock is not configured")]
    MissingClock,
}

// ============================================================================
// SECTION: Cycle Result
// ============================================================================

/// Observable result of one reactor cycle.
///
/// # Invariants
/// - `responded` is false only for unaddressable messages.
/// - `acknowledged` is false only for deliveries without a receipt handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// No message arrived within the poll bound.
    Idle,
    /// One message was processed to completion.
    Completed {
        /// Dispatch, validation, or decode outcome.
        outcome: DispatchOutcome,
        /// Whether a notification was published.
        responded: bool,
        /// Whether the delivery was deleted from the queue.
        acknowledged: bool,
    },
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a reactor.
///
/// # Invariants
/// - `build` succeeds only when every collaborator is configured.
#[derive(Default)]
pub struct ReactorBuilder {
    /// Role store gateway.
    store: Option<Arc<dyn RoleStore>>,
    /// Inbound command queue.
    source: Option<Arc<dyn QueueSource>>,
    /// Outbound notification sink.
    sink: Option<Arc<dyn NotifySink>>,
    /// External rollback engine.
    rollback: Option<Arc<dyn RollbackEngine>>,
    /// Host-supplied clock.
    clock: Option<Arc<dyn Clock>>,
    /// Dispatch configuration; defaults apply when unset.
    config: Option<DispatchConfig>,
    /// Long-poll bound; [`DEFAULT_POLL_WAIT`] when unset.
    poll_wait: Option<Duration>,
}

impl ReactorBuilder {
    /// Registers the role store gateway.
    #[must_use]
    pub fn store(mut self, store: impl RoleStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Registers the inbound queue source.
    #[must_use]
    pub fn source(mut self, source: impl QueueSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Registers the outbound notify sink.
    #[must_use]
    pub fn sink(mut self, sink: impl NotifySink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Registers the rollback engine.
    #[must_use]
    pub fn rollback(mut self, rollback: impl RollbackEngine + 'static) -> Self {
        self.rollback = Some(Arc::new(rollback));
        self
    }

    /// Registers the clock.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Sets the dispatch configuration.
    #[must_use]
    pub const fn config(mut self, config: DispatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the long-poll bound for receive calls.
    #[must_use]
    pub const fn poll_wait(mut self, poll_wait: Duration) -> Self {
        self.poll_wait = Some(poll_wait);
        self
    }

    /// Builds the reactor.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorBuildError`] naming the first missing collaborator.
    pub fn build(self) -> Result<Reactor, ReactorBuildError> {
        Ok(Reactor {
            store: self.store.ok_or(ReactorBuildError::MissingStore)?,
            source: self.source.ok_or(ReactorBuildError::MissingSource)?,
            sink: self.sink.ok_or(ReactorBuildError::MissingSink)?,
            rollback: self.rollback.ok_or(ReactorBuildError::MissingRollback)?,
            clock: self.clock.ok_or(ReactorBuildError::MissingClock)?,
            config: self.config.unwrap_or_default(),
            poll_wait: self.poll_wait.unwrap_or(DEFAULT_POLL_WAIT),
        })
    }
}

// ============================================================================
// SECTION: Reactor
// ============================================================================

/// Long-running command reactor.
///
/// # Invariants
/// - Every collaborator is configured; cycles are strictly sequential.
pub struct Reactor {
    /// Role store gateway.
    store: Arc<dyn RoleStore>,
    /// Inbound command queue.
    source: Arc<dyn QueueSource>,
    /// Outbound notification sink.
    sink: Arc<dyn NotifySink>,
    /// External rollback engine.
    rollback: Arc<dyn RollbackEngine>,
    /// Host-supplied clock.
    clock: Arc<dyn Clock>,
    /// Dispatch configuration.
    config: DispatchConfig,
    /// Long-poll bound for receive calls.
    poll_wait: Duration,
}

impl Reactor {
    /// Returns a builder for the reactor.
    #[must_use]
    pub fn builder() -> ReactorBuilder {
        ReactorBuilder::default()
    }

    /// Runs the loop forever.
    ///
    /// Faults are logged and the loop continues; only process shutdown ends
    /// it.
    pub fn run(&self) -> ! {
        loop {
            match self.run_once() {
                Ok(Cycle::Idle) => {}
                Ok(Cycle::Completed {
                    outcome, ..
                }) => {
                    debug!(success = outcome.success, "command cycle completed");
                }
                Err(err) => {
                    error!(error = %err, "reactor cycle fault; delivery left for redelivery");
                }
            }
        }
    }

    /// Runs one cycle: at most one message end to end.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError`] on infrastructure faults; the delivery is
    /// then not acknowledged and the transport may redeliver it.
    pub fn run_once(&self) -> Result<Cycle, ReactorError> {
        let Some(delivery) = self.source.receive(self.poll_wait)? else {
            return Ok(Cycle::Idle);
        };

        let (address, outcome) = self.process_body(&delivery.body)?;

        let responded = if let Some(address) = address {
            let notification = Notification::new(&address, &outcome);
            self.sink.publish(&notification)?;
            true
        } else {
            warn!(text = %outcome.text, "dropping reply for unaddressable message");
            false
        };

        let acknowledged = if let Some(receipt) = &delivery.receipt {
            self.source.delete(receipt)?;
            true
        } else {
            false
        };

        Ok(Cycle::Completed {
            outcome,
            responded,
            acknowledged,
        })
    }

    /// Decodes, validates, and dispatches one message body.
    fn process_body(
        &self,
        body: &str,
    ) -> Result<(Option<ResponseAddress>, DispatchOutcome), ReactorError> {
        let object = match decode_body(body) {
            Ok(object) => object,
            Err(err) => {
                warn!(error = %err, "received malformed queue message");
                return Ok((None, DispatchOutcome::failure("Received malformed queue message")));
            }
        };

        // Addressing is salvaged before validation so schema failures can
        // still be reported to the requesting channel.
        let salvaged = ResponseAddress::salvage(&object);

        match CommandMessage::from_object(&object) {
            Err(err) => {
                Ok((salvaged, DispatchOutcome::failure(format!("Malformed message: {err}"))))
            }
            Ok(message) => {
                let deps = HandlerDeps {
                    store: self.store.as_ref(),
                    rollback: self.rollback.as_ref(),
                    clock: self.clock.as_ref(),
                    config: &self.config,
                };
                let outcome = handlers::dispatch(&deps, &message)?;
                Ok((Some(ResponseAddress::from_message(&message)), outcome))
            }
        }
    }
}
