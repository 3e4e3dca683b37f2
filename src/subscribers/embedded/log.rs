//! # LogWriter: events as `tracing` records
//!
//! Lifecycle transitions are logged at `info`, failures and losses at `warn`,
//! panics at `error`. All records use the `brokervisor` target.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  brokervisor: dialing attempt=1
//! WARN  brokervisor: dial failed attempt=1 err="connection refused"
//! INFO  brokervisor: reconnect scheduled attempt=1 delay_ms=5000
//! INFO  brokervisor: connected attempt=2 epoch=1
//! WARN  brokervisor: connection lost epoch=1 err="connection closed: exception (320) ..."
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Dialing => {
                info!(target: "brokervisor", attempt = e.attempt, "dialing");
            }
            EventKind::DialFailed => {
                warn!(target: "brokervisor", attempt = e.attempt, err = reason, "dial failed");
            }
            EventKind::BackoffScheduled => {
                info!(
                    target: "brokervisor",
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    "reconnect scheduled"
                );
            }
            EventKind::Connected => {
                info!(target: "brokervisor", attempt = e.attempt, epoch = e.epoch, "connected");
            }
            EventKind::ConnectionLost => {
                warn!(target: "brokervisor", epoch = e.epoch, err = reason, "connection lost");
            }
            EventKind::ShutdownRequested => {
                info!(target: "brokervisor", "shutdown requested");
            }
            EventKind::Closed if e.reason.is_some() => {
                warn!(target: "brokervisor", err = reason, "closed with error");
            }
            EventKind::Closed => {
                info!(target: "brokervisor", "closed");
            }
            EventKind::CallbackPanicked => {
                error!(target: "brokervisor", epoch = e.epoch, info = reason, "callback panicked");
            }
            EventKind::SubscriberOverflow => {
                warn!(
                    target: "brokervisor",
                    subscriber = e.subscriber.unwrap_or("unknown"),
                    reason,
                    "subscriber dropped event"
                );
            }
            EventKind::SubscriberPanicked => {
                error!(
                    target: "brokervisor",
                    subscriber = e.subscriber.unwrap_or("unknown"),
                    info = reason,
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
