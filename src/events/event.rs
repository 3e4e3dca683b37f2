//! # Events emitted by the supervisor.
//!
//! [`EventKind`] covers three groups:
//! - **Dialing**: attempts, failures, and scheduled retries;
//! - **Epochs**: a connection becoming ready and being lost;
//! - **Runtime**: shutdown, callback panics, subscriber problems.
//!
//! Each [`Event`] carries a globally monotonic `seq` so consumers can restore
//! order after fan-out.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use brokervisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(5))
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.delay_ms, Some(5_000));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Dialing ===
    /// A dial attempt is starting.
    ///
    /// Sets: `attempt`.
    Dialing,

    /// A dial attempt failed; the loop will retry.
    ///
    /// Sets: `attempt`, `reason`.
    DialFailed,

    /// The next dial has been scheduled after a failure.
    ///
    /// Sets: `attempt` (the failed one), `delay_ms`, `reason`.
    BackoffScheduled,

    // === Epochs ===
    /// A connection was installed and the supervisor is ready.
    ///
    /// Sets: `attempt`, `epoch`.
    Connected,

    /// The ready epoch ended (broker/network closure or shutdown).
    ///
    /// Sets: `epoch`, `reason`.
    ConnectionLost,

    // === Runtime ===
    /// The owner asked the supervisor to stop.
    ShutdownRequested,

    /// The supervisor is closed for good.
    ///
    /// Sets: `reason` when the collaborator failed to close the connection.
    Closed,

    /// A lifecycle callback panicked on the reconnect loop.
    ///
    /// Sets: `epoch`, `reason` (panic message).
    CallbackPanicked,

    /// A subscriber dropped an event (queue full or worker gone).
    ///
    /// Sets: `subscriber`, `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `subscriber`, `reason`.
    SubscriberPanicked,
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Lifetime dial attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Ready epoch number (starting from 1).
    pub epoch: Option<u64>,
    /// Delay before the next dial, in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, panic messages, overflow details).
    pub reason: Option<Arc<str>>,
    /// Subscriber name, for subscriber events.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            attempt: None,
            epoch: None,
            delay_ms: None,
            reason: None,
            subscriber: None,
        }
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    #[inline]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::Dialing);
        let b = Event::new(EventKind::DialFailed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_saturates() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn subscriber_events_carry_name() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.subscriber, Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}
