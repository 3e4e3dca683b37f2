//! # In-process broker.
//!
//! [`MemoryBroker`] implements [`Connector`] without any network. Tests and
//! demos use it to script outages:
//!
//! ```text
//! broker.refuse(true)        every dial fails until refuse(false)
//! broker.fail_next(n)        the next n dials fail
//! broker.latest()            handle to the most recently dialed connection
//! conn.sever(err)            fire the close notification with `err`
//! ```
//!
//! Handles are cheap clones sharing one state, so a test keeps a clone while
//! the supervisor owns another.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Notify, oneshot};

use crate::broker::{CloseSignal, Connection, Connector, DialOptions};
use crate::error::BrokerError;

/// Reply code used for refused dials.
const CONNECTION_REFUSED: u16 = 501;

#[derive(Default)]
struct BrokerState {
    refuse: bool,
    fail_next: u32,
    close_error: Option<BrokerError>,
    connections: Vec<MemoryConnection>,
    last_options: Option<(String, DialOptions)>,
}

/// Scriptable in-process broker.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    dials: Arc<AtomicU32>,
    dialed: Arc<Notify>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refuses (or accepts again) every dial.
    pub fn refuse(&self, refuse: bool) {
        self.state().refuse = refuse;
    }

    /// Makes the next `n` dials fail.
    pub fn fail_next(&self, n: u32) {
        self.state().fail_next = n;
    }

    /// Makes `close()` on connections dialed from now on fail with `err`.
    pub fn fail_close_with(&self, err: BrokerError) {
        self.state().close_error = Some(err);
    }

    /// Total dial attempts, successful or not.
    pub fn dial_count(&self) -> u32 {
        self.dials.load(Ordering::Acquire)
    }

    /// Waits until at least `n` dial attempts have been made.
    pub async fn wait_for_dials(&self, n: u32) {
        loop {
            let notified = self.dialed.notified();
            if self.dial_count() >= n {
                return;
            }
            notified.await;
        }
    }

    /// All connections handed out so far, oldest first.
    pub fn connections(&self) -> Vec<MemoryConnection> {
        self.state().connections.clone()
    }

    /// The most recently dialed connection.
    pub fn latest(&self) -> Option<MemoryConnection> {
        self.state().connections.last().cloned()
    }

    /// Address and options of the most recent dial.
    pub fn last_dial(&self) -> Option<(String, DialOptions)> {
        self.state().last_options.clone()
    }
}

#[async_trait]
impl Connector for MemoryBroker {
    type Connection = MemoryConnection;

    async fn dial(&self, addr: &str, opts: &DialOptions) -> Result<MemoryConnection, BrokerError> {
        let outcome = {
            let mut state = self.state();
            state.last_options = Some((addr.to_owned(), opts.clone()));
            if state.refuse || state.fail_next > 0 {
                state.fail_next = state.fail_next.saturating_sub(1);
                Err(BrokerError::new(CONNECTION_REFUSED, "connection refused"))
            } else {
                let id = state.connections.len() as u64 + 1;
                let conn = MemoryConnection::new(id, state.close_error.clone());
                state.connections.push(conn.clone());
                Ok(conn)
            }
        };
        self.dials.fetch_add(1, Ordering::AcqRel);
        self.dialed.notify_waiters();
        outcome
    }
}

struct ConnectionInner {
    id: u64,
    closed: AtomicBool,
    channels: AtomicU64,
    listeners: Mutex<Vec<oneshot::Sender<BrokerError>>>,
    close_error: Option<BrokerError>,
}

/// Connection produced by [`MemoryBroker`].
#[derive(Clone)]
pub struct MemoryConnection {
    inner: Arc<ConnectionInner>,
}

/// Channel opened on a [`MemoryConnection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryChannel {
    pub connection: u64,
    pub id: u64,
}

impl MemoryConnection {
    fn new(id: u64, close_error: Option<BrokerError>) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                id,
                closed: AtomicBool::new(false),
                channels: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
                close_error,
            }),
        }
    }

    /// Dial order of this connection (starting from 1).
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Channels opened so far.
    pub fn channel_count(&self) -> u64 {
        self.inner.channels.load(Ordering::Acquire)
    }

    /// Terminates the connection as the broker would, notifying listeners with `err`.
    ///
    /// Returns `false` if it was already closed.
    pub fn sever(&self, err: BrokerError) -> bool {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        for tx in self.take_listeners() {
            let _ = tx.send(err.clone());
        }
        true
    }

    /// Fires `err` at current listeners without marking the connection closed.
    ///
    /// Models a late notification racing a reconnect.
    pub fn notify_listeners(&self, err: BrokerError) {
        for tx in self.take_listeners() {
            let _ = tx.send(err.clone());
        }
    }

    fn take_listeners(&self) -> Vec<oneshot::Sender<BrokerError>> {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *listeners)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    type Channel = MemoryChannel;

    fn notify_close(&self) -> CloseSignal {
        let (tx, rx) = oneshot::channel();
        if self.is_closed() {
            let _ = tx.send(BrokerError::closed());
        } else {
            self.inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(tx);
        }
        rx
    }

    async fn open_channel(&self) -> Result<MemoryChannel, BrokerError> {
        if self.is_closed() {
            return Err(BrokerError::closed());
        }
        let id = self.inner.channels.fetch_add(1, Ordering::AcqRel) + 1;
        Ok(MemoryChannel {
            connection: self.inner.id,
            id,
        })
    }

    /// Graceful close: listeners are dropped without an error.
    async fn close(&self) -> Result<(), BrokerError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Err(BrokerError::closed());
        }
        drop(self.take_listeners());
        match &self.inner.close_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn opts() -> DialOptions {
        DialOptions {
            vhost: "/".into(),
            channel_max: 0,
            frame_size: 0,
            heartbeat: Duration::from_secs(1),
            locale: "en_US".into(),
            properties: Default::default(),
        }
    }

    #[tokio::test]
    async fn scripted_failures_then_success() {
        let broker = MemoryBroker::new();
        broker.fail_next(2);

        assert!(broker.dial("amqp://x", &opts()).await.is_err());
        assert!(broker.dial("amqp://x", &opts()).await.is_err());
        let conn = broker.dial("amqp://x", &opts()).await.unwrap();

        assert_eq!(conn.id(), 1);
        assert_eq!(broker.dial_count(), 3);
        assert_eq!(broker.last_dial().unwrap().0, "amqp://x");
    }

    #[tokio::test]
    async fn sever_fires_listeners_once() {
        let broker = MemoryBroker::new();
        let conn = broker.dial("amqp://x", &opts()).await.unwrap();
        let signal = conn.notify_close();

        assert!(conn.sever(BrokerError::server(320, "CONNECTION_FORCED", true)));
        assert!(!conn.sever(BrokerError::closed()));
        assert_eq!(signal.await.unwrap().code, 320);
        assert!(conn.open_channel().await.is_err());
    }

    #[tokio::test]
    async fn graceful_close_drops_listeners() {
        let broker = MemoryBroker::new();
        let conn = broker.dial("amqp://x", &opts()).await.unwrap();
        let signal = conn.notify_close();

        conn.close().await.unwrap();
        assert!(signal.await.is_err());
        assert!(conn.close().await.is_err());
    }
}
