//! # Connection slot: the published view of the supervisor state.
//!
//! The reconnect loop is the only writer. Every transition builds a fresh
//! immutable [`Snapshot`] and swaps it in atomically, so readers always see a
//! state, epoch, and connection that belong together. A parallel `watch`
//! channel carries just the [`LinkState`] for callers that want to await a
//! transition instead of polling.

use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Externally visible supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// A dial is in progress or scheduled.
    Connecting,
    /// A live connection is installed.
    Ready,
    /// The ready connection was just lost; a redial follows.
    Disconnected,
    /// Shutdown observed; the loop is closing the connection.
    ShuttingDown,
    /// Shut down for good.
    Closed,
}

impl LinkState {
    #[inline]
    pub fn is_ready(self) -> bool {
        matches!(self, LinkState::Ready)
    }

    #[inline]
    pub fn is_closed(self) -> bool {
        matches!(self, LinkState::Closed)
    }

    /// `true` once shutdown has been observed.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, LinkState::ShuttingDown | LinkState::Closed)
    }
}

/// One published state record. Never mutated after publication.
pub(crate) struct Snapshot<C> {
    pub state: LinkState,
    pub epoch: u64,
    /// Present iff `state == Ready`.
    pub conn: Option<Arc<C>>,
    /// Token of the ready epoch, present iff `state == Ready`.
    pub token: Option<CancellationToken>,
}

impl<C> Snapshot<C> {
    /// A snapshot without a connection.
    pub fn idle(state: LinkState, epoch: u64) -> Self {
        debug_assert!(!state.is_ready());
        Self {
            state,
            epoch,
            conn: None,
            token: None,
        }
    }

    pub fn ready(epoch: u64, conn: Arc<C>, token: CancellationToken) -> Self {
        Self {
            state: LinkState::Ready,
            epoch,
            conn: Some(conn),
            token: Some(token),
        }
    }
}

pub(crate) struct Slot<C> {
    current: ArcSwap<Snapshot<C>>,
    state_tx: watch::Sender<LinkState>,
}

impl<C> Slot<C> {
    pub fn new() -> Self {
        let (state_tx, _rx) = watch::channel(LinkState::Connecting);
        Self {
            current: ArcSwap::from_pointee(Snapshot::idle(LinkState::Connecting, 0)),
            state_tx,
        }
    }

    /// Lock-free read of the current snapshot.
    #[inline]
    pub fn load(&self) -> Guard<Arc<Snapshot<C>>> {
        self.current.load()
    }

    /// Installs `snap`, then notifies state watchers.
    pub fn publish(&self, snap: Snapshot<C>) {
        let state = snap.state;
        self.current.store(Arc::new(snap));
        self.state_tx.send_replace(state);
    }

    pub fn watch(&self) -> watch::Receiver<LinkState> {
        self.state_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting_without_connection() {
        let slot = Slot::<u8>::new();
        let snap = slot.load();
        assert_eq!(snap.state, LinkState::Connecting);
        assert_eq!(snap.epoch, 0);
        assert!(snap.conn.is_none() && snap.token.is_none());
    }

    #[test]
    fn shutting_down_is_terminal_but_not_closed() {
        assert!(LinkState::ShuttingDown.is_terminal());
        assert!(!LinkState::ShuttingDown.is_closed());
        assert!(LinkState::Closed.is_terminal());
        assert!(!LinkState::Disconnected.is_terminal());
    }

    #[tokio::test]
    async fn publish_swaps_snapshot_and_wakes_watchers() {
        let slot = Slot::new();
        let mut rx = slot.watch();

        slot.publish(Snapshot::ready(1, Arc::new(7u8), CancellationToken::new()));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), LinkState::Ready);

        let snap = slot.load();
        assert_eq!(snap.epoch, 1);
        assert_eq!(snap.conn.as_deref(), Some(&7));
    }
}
