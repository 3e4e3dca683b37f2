use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::config::SupervisorConfig;
use super::reconnect::Reconnector;
use super::slot::{LinkState, Slot, Snapshot};
use super::supervisor::Supervisor;
use crate::{
    broker::Connector,
    error::BrokerError,
    events::{Bus, Event, EventKind},
    subscribers::{Subscribe, SubscriberSet, panic_message},
};

/// Builder for a [`Supervisor`] with optional subscribers.
pub struct SupervisorBuilder<B: Connector> {
    cfg: SupervisorConfig<B::Connection>,
    connector: B,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<B: Connector> SupervisorBuilder<B> {
    pub fn new(cfg: SupervisorConfig<B::Connection>, connector: B) -> Self {
        Self {
            cfg,
            connector,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers (logging, metrics, alerting).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Wires the bus, subscriber workers, and the reconnect loop, then returns
    /// without waiting for the first dial.
    pub fn build(self) -> Arc<Supervisor<B>> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let slot = Arc::new(Slot::new());
        let shutdown = CancellationToken::new();

        if !self.subscribers.is_empty() {
            spawn_listener(&bus, SubscriberSet::new(self.subscribers, bus.clone()));
        }

        let reconnector = Reconnector {
            connector: self.connector,
            cfg: self.cfg,
            slot: Arc::clone(&slot),
            bus: bus.clone(),
        };
        let handle = spawn_reconnector(reconnector, shutdown.clone());

        Arc::new(Supervisor {
            slot,
            bus,
            shutdown,
            closing: AtomicBool::new(false),
            reconnector: Mutex::new(Some(handle)),
        })
    }
}

/// Spawns the reconnect loop.
///
/// A panic escaping the collaborator ends the loop: the supervisor is marked
/// `Closed` with the panic message as reason and every epoch token is cancelled.
fn spawn_reconnector<B: Connector>(
    reconnector: Reconnector<B>,
    shutdown: CancellationToken,
) -> JoinHandle<Result<(), BrokerError>> {
    let slot = Arc::clone(&reconnector.slot);
    let bus = reconnector.bus.clone();

    tokio::spawn(async move {
        let run = AssertUnwindSafe(reconnector.run(shutdown.clone()));
        match run.catch_unwind().await {
            Ok(res) => res,
            Err(panic) => {
                shutdown.cancel();
                let epoch = slot.load().epoch;
                let reason = format!("reconnect loop panicked: {}", panic_message(&*panic));
                slot.publish(Snapshot::idle(LinkState::Closed, epoch));
                bus.publish(Event::new(EventKind::Closed).with_epoch(epoch).with_reason(reason));
                Ok(())
            }
        }
    })
}

/// Forwards bus events to the subscriber set until the supervisor reports `Closed`,
/// then drains the subscriber queues.
fn spawn_listener(bus: &Bus, subs: SubscriberSet) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    let last = ev.kind == EventKind::Closed;
                    subs.emit(ev);
                    if last {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
