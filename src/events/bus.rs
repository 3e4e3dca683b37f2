//! # Broadcast bus for supervisor events.
//!
//! ```text
//! Publishers:                     Receivers:
//!   reconnect loop ──┐
//!   close()        ──┼──► Bus ──► supervisor listener ──► SubscriberSet
//!   subscriber set ──┘        └─► Supervisor::events() receivers
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event is dropped.
//! - A single ring buffer of `capacity` events is shared by all receivers.
//! - Receivers that fall behind observe `RecvError::Lagged(n)` and skip `n` events.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the event channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to every current receiver.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_only_see_later_events() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::Dialing));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Connected).with_epoch(1));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::Connected);
        assert_eq!(ev.epoch, Some(1));
        assert!(rx.try_recv().is_err());
    }
}
