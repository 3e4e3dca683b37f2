//! # Subscriber trait.
//!
//! Each subscriber gets its own bounded queue and worker task inside the
//! [`SubscriberSet`](crate::SubscriberSet):
//! - a slow subscriber only delays its own queue;
//! - on overflow the event is dropped for that subscriber and
//!   `EventKind::SubscriberOverflow` is published;
//! - panics are caught and published as `EventKind::SubscriberPanicked`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use brokervisor::{Event, EventKind, Subscribe};
//!
//! struct Outages;
//!
//! #[async_trait]
//! impl Subscribe for Outages {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ConnectionLost {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "outages" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of supervisor events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event, in FIFO order, on this subscriber's worker task.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
