//! Supervisor events: data model and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the reconnect loop, `Supervisor::close`, `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumers**: the supervisor's listener (fans out to `SubscriberSet`) and any
//!   receiver obtained from `Supervisor::events`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
