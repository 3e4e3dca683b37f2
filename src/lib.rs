//! # brokervisor
//!
//! **brokervisor** keeps one message-broker connection alive so callers never
//! write reconnect logic themselves.
//!
//! A [`Supervisor`] owns a single logical connection. A background loop dials
//! it, listens for its close notification, and redials on a fixed interval
//! whenever it is lost. Callers ask for the live connection (or a fresh
//! channel) whenever they need to talk to the broker.
//!
//! The wire protocol stays with an external client library, adapted through the
//! [`Connector`] and [`Connection`] traits.
//!
//! ## Architecture
//! ```text
//!   SupervisorConfig ──► Supervisor::new(cfg, connector)
//!                              │
//!          ┌───────────────────┼─────────────────────────────┐
//!          ▼                   ▼                             ▼
//!   Slot (ArcSwap)      Reconnector::run()            Bus (broadcast)
//!   ▲  lock-free reads    │ dial ─► Ready ─► wait          │
//!   │                     │   ▲        close signal ─┐     ▼
//!   │                     │   └── sleep(interval) ◄──┘   SubscriberSet
//!   │                     │                              ├─► LogWriter
//!   └── publish(Snapshot)─┘                              └─► custom
//!
//!   caller ── conn() / channel() / session() ──► Slot
//!   caller ── close() ──► shutdown token ──► loop closes connection, exits
//! ```
//!
//! ### States
//! ```text
//! Connecting ── dial ok ──► Ready ── close signal ──► Disconnected ──► Connecting
//!     │  ▲                    │
//!     └──┘ dial err, sleep    └── close() ──► ShuttingDown ──► Closed
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types                                  |
//! |-------------------|------------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | One self-healing connection with race-free accessors.      | [`Supervisor`], [`Session`], [`LinkState`] |
//! | **Configuration** | Immutable options built fluently, validated once.          | [`SupervisorConfig`], [`SupervisorConfigBuilder`] |
//! | **Callbacks**     | `on_connect` / `on_connection_lost` hooks per epoch.       | [`OnConnect`], [`OnConnectionLost`], [`LossCause`] |
//! | **Policies**      | Fixed (default) or exponential reconnect delays, jitter.   | [`ReconnectPolicy`], [`JitterPolicy`]      |
//! | **Events**        | Lifecycle events fanned out to isolated subscribers.       | [`Event`], [`EventKind`], [`Subscribe`]    |
//! | **Errors**        | Typed errors for callers and the collaborator.             | [`SupervisorError`], [`BrokerError`]       |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that renders events through `tracing`.
//! - `memory`: exports [`memory::MemoryBroker`], an in-process broker for tests and demos.

mod broker;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

// ---- Public re-exports ----

pub use broker::{CloseSignal, Connection, Connector, DialOptions, FieldValue, Properties};
pub use crate::core::{
    DEFAULT_ADDR, LinkState, OnConnect, OnConnectionLost, Session, Supervisor, SupervisorBuilder,
    SupervisorConfig, SupervisorConfigBuilder,
};
pub use error::{BrokerError, LossCause, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use policies::{JitterPolicy, ReconnectPolicy};
pub use subscribers::{Subscribe, SubscriberSet};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
