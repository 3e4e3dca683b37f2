//! # Event subscribers.
//!
//! ```text
//! reconnect loop ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                            ├──► [queue] ──► LogWriter
//!                                                            ├──► [queue] ──► metrics
//!                                                            └──► [queue] ──► custom
//! ```
//!
//! Subscribers observe the supervisor; they cannot influence it. Anything that
//! must act on a connection (declaring topology, starting consumers) belongs in
//! the `on_connect` callback instead.

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub(crate) use set::panic_message;
pub use subscribe::Subscribe;
