//! Reconnect timing policies.
//!
//! ## Contents
//! - [`ReconnectPolicy`] how long the loop waits after a failed dial
//! - [`JitterPolicy`] randomization applied on top of that wait
//!
//! ## Defaults
//! - `ReconnectPolicy::default()` → fixed 5s interval, no growth, no jitter.
//! - `JitterPolicy::None`.

mod jitter;
mod reconnect;

pub use jitter::JitterPolicy;
pub use reconnect::ReconnectPolicy;
