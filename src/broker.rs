//! # Broker protocol collaborator.
//!
//! The supervisor never speaks the wire protocol itself. Everything below the
//! connection (framing, authentication, heartbeats) belongs to an external
//! client library, adapted to these two traits:
//!
//! - [`Connector`] dials a new [`Connection`];
//! - [`Connection`] can report its own closure, open channels, and close.
//!
//! ## Close notification
//! ```text
//! Connection::notify_close() ──► CloseSignal (oneshot)
//!                                   ├─ Ok(err)  → broker/network closed it with `err`
//!                                   └─ Err(_)   → sender dropped, treated as BrokerError::closed()
//! ```
//! A fresh signal is requested for every installed connection, so a signal
//! belonging to a superseded connection can never be observed by the loop.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::BrokerError;

/// Receiver fired once when a connection terminates.
pub type CloseSignal = oneshot::Receiver<BrokerError>;

/// Client properties table sent to the broker during the handshake.
pub type Properties = BTreeMap<String, FieldValue>;

/// A value in the client properties table.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Table(Properties),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// Connection tuning passed to every [`Connector::dial`].
///
/// Zero values keep their protocol meaning: `channel_max = 0` is the protocol
/// maximum (65535), `frame_size = 0` is unlimited, and a heartbeat below one
/// second defers to the server's interval.
#[derive(Clone, Debug, PartialEq)]
pub struct DialOptions {
    pub vhost: String,
    pub channel_max: u16,
    pub frame_size: u32,
    pub heartbeat: Duration,
    pub locale: String,
    pub properties: Properties,
}

/// Dials broker connections.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by a successful dial.
    type Connection: Connection;

    /// Establishes a new connection to `addr`.
    async fn dial(&self, addr: &str, opts: &DialOptions) -> Result<Self::Connection, BrokerError>;
}

/// A live broker connection.
///
/// The supervisor shares connections behind an `Arc`; callers may open channels
/// on a handle they obtained but must leave closing to the supervisor.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Channel type opened on this connection.
    type Channel: Send + 'static;

    /// Registers a listener that fires when this connection terminates.
    fn notify_close(&self) -> CloseSignal;

    /// Opens a fresh protocol channel.
    async fn open_channel(&self) -> Result<Self::Channel, BrokerError>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), BrokerError>;
}
