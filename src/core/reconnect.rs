//! # Reconnect loop: the single writer of the connection slot.
//!
//! ## State machine
//! ```text
//!            ┌──────────── dial Err ─► DialFailed, BackoffScheduled, sleep ──┐
//!            ▼                                                               │
//! ──► Connecting ──── dial(addr, opts) ──────────────────────────────────────┘
//!            │
//!            └─ dial Ok ─► notify_close() wired ─► publish Ready(epoch+1) ─► on_connect
//!                                                       │
//!                    ┌──────────────────────────────────┤
//!                    ▼                                  ▼
//!            close signal fires                 shutdown cancelled
//!               publish Disconnected               publish ShuttingDown
//!               on_connection_lost(err)            on_connection_lost(ClosedByCaller)
//!               back to Connecting                 connection.close(), publish Closed
//! ```
//!
//! ## Rules
//! - The loop waits on exactly one thing at a time together with shutdown:
//!   the dial, the backoff timer, or the close signal.
//! - A connection's close signal is requested before the connection is published,
//!   and lives only for that epoch; a signal from a superseded connection is
//!   never polled again.
//! - The epoch token is cancelled before `on_connection_lost` runs.
//! - Callbacks run inline; a panic is caught and reported as `CallbackPanicked`.
//! - Dial failures are retried forever; only shutdown ends the loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::broker::{Connection, Connector};
use crate::core::config::SupervisorConfig;
use crate::core::slot::{LinkState, Slot, Snapshot};
use crate::error::{BrokerError, LossCause, SupervisorError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;

pub(crate) struct Reconnector<B: Connector> {
    pub connector: B,
    pub cfg: SupervisorConfig<B::Connection>,
    pub slot: Arc<Slot<B::Connection>>,
    pub bus: Bus,
}

impl<B: Connector> Reconnector<B> {
    /// Runs until `shutdown` is cancelled.
    ///
    /// Returns the collaborator's result of closing the connection that was
    /// live at shutdown (`Ok` when none was).
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), BrokerError> {
        let opts = self.cfg.dial_options();
        let mut attempt: u32 = 0;
        let mut failures: u32 = 0;
        let mut epoch: u64 = 0;

        loop {
            if shutdown.is_cancelled() {
                return self.finish(epoch, None).await;
            }
            self.slot.publish(Snapshot::idle(LinkState::Connecting, epoch));

            attempt = attempt.saturating_add(1);
            self.bus.publish(Event::new(EventKind::Dialing).with_attempt(attempt));

            let dialed = select! {
                biased;
                _ = shutdown.cancelled() => return self.finish(epoch, None).await,
                res = self.connector.dial(&self.cfg.addr, &opts) => res,
            };

            let conn = match dialed {
                Ok(conn) => Arc::new(conn),
                Err(source) => {
                    let reason = SupervisorError::DialFailed { attempt, source }.to_string();
                    let delay = self.cfg.reconnect.delay(failures);
                    failures = failures.saturating_add(1);

                    self.bus.publish(
                        Event::new(EventKind::DialFailed)
                            .with_attempt(attempt)
                            .with_reason(reason.as_str()),
                    );
                    self.bus.publish(
                        Event::new(EventKind::BackoffScheduled)
                            .with_attempt(attempt)
                            .with_delay(delay)
                            .with_reason(reason),
                    );

                    select! {
                        biased;
                        _ = shutdown.cancelled() => return self.finish(epoch, None).await,
                        _ = time::sleep(delay) => continue,
                    }
                }
            };

            failures = 0;
            epoch += 1;
            let mut closed = conn.notify_close();
            let token = shutdown.child_token();

            self.slot.publish(Snapshot::ready(epoch, Arc::clone(&conn), token.clone()));
            self.bus.publish(
                Event::new(EventKind::Connected)
                    .with_attempt(attempt)
                    .with_epoch(epoch),
            );
            if let Some(on_connect) = &self.cfg.on_connect {
                self.guard(epoch, || on_connect(&conn, &token));
            }

            let cause = select! {
                biased;
                _ = shutdown.cancelled() => None,
                res = &mut closed => {
                    Some(LossCause::Closed(res.unwrap_or_else(|_| BrokerError::closed())))
                }
            };
            token.cancel();

            match cause {
                Some(cause) => {
                    self.slot.publish(Snapshot::idle(LinkState::Disconnected, epoch));
                    self.lost(epoch, &conn, &cause);
                }
                None => return self.finish(epoch, Some(conn)).await,
            }
        }
    }

    /// Final transition: end the epoch if one is live, close it, publish `Closed`.
    async fn finish(
        &self,
        epoch: u64,
        conn: Option<Arc<B::Connection>>,
    ) -> Result<(), BrokerError> {
        self.slot.publish(Snapshot::idle(LinkState::ShuttingDown, epoch));

        let result = match conn {
            Some(conn) => {
                self.lost(epoch, &conn, &LossCause::ClosedByCaller);
                // A connection the broker already dropped counts as closed.
                match conn.close().await {
                    Err(e) if e.is_closed() => Ok(()),
                    res => res,
                }
            }
            None => Ok(()),
        };
        self.slot.publish(Snapshot::idle(LinkState::Closed, epoch));

        let mut ev = Event::new(EventKind::Closed).with_epoch(epoch);
        if let Err(e) = &result {
            ev = ev.with_reason(e.to_string());
        }
        self.bus.publish(ev);
        result
    }

    fn lost(&self, epoch: u64, conn: &Arc<B::Connection>, cause: &LossCause) {
        self.bus.publish(
            Event::new(EventKind::ConnectionLost)
                .with_epoch(epoch)
                .with_reason(cause.to_string()),
        );
        if let Some(on_lost) = &self.cfg.on_connection_lost {
            self.guard(epoch, || on_lost(conn, cause));
        }
    }

    fn guard(&self, epoch: u64, f: impl FnOnce()) {
        if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(f)) {
            self.bus.publish(
                Event::new(EventKind::CallbackPanicked)
                    .with_epoch(epoch)
                    .with_reason(panic_message(&*panic)),
            );
        }
    }
}
