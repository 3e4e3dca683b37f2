//! Runtime core: the supervisor and its reconnect loop.
//!
//! Internal modules:
//! - [`config`]: immutable configuration and its fluent builder;
//! - [`slot`]: atomically published state snapshots;
//! - [`reconnect`]: the background loop (single writer of the slot);
//! - [`supervisor`]: the public handle and its accessors;
//! - [`builder`]: wiring of bus, subscribers, and loop.

mod builder;
pub(crate) mod config;
mod reconnect;
mod slot;
mod supervisor;


pub use builder::SupervisorBuilder;
pub use config::{
    DEFAULT_ADDR, OnConnect, OnConnectionLost, SupervisorConfig, SupervisorConfigBuilder,
};
pub use slot::LinkState;
pub use supervisor::{Session, Supervisor};
