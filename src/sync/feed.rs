//! Background task keeping a [`ClientStore`] in sync with the backend.
//!
//! Two strategies exist: applying realtime events as they arrive, and
//! polling full snapshots at a fixed interval. Exactly one is active at a
//! time, and a single scheduler task owns every timer involved, so the
//! strategies can never race each other.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::{
    sync::{RwLock, broadcast, watch},
    task::JoinHandle,
    time::{Instant, sleep, sleep_until},
};
use tracing::{debug, warn};

use crate::sync::{FeedError, Snapshot, StateEvent, store::ClientStore};

/// Where the feed currently gets its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedHealth {
    /// Realtime stream up, events applied as they arrive.
    Connected,
    /// Stream down, waiting out the grace period before polling.
    Degraded,
    /// Stream down for too long, refreshing on a fixed interval.
    Polling,
}

/// Source of realtime events plus a view of the connection health.
pub trait FeedTransport: Send + Sync + 'static {
    /// Fresh receiver for the event stream.
    fn subscribe(&self) -> broadcast::Receiver<StateEvent>;
    /// Watch that flips to `false` when the stream connection is lost.
    fn connection_watch(&self) -> watch::Receiver<bool>;
}

/// Source of full state snapshots, used at startup and as the fallback.
pub trait SnapshotSource: Send + Sync + 'static {
    /// Fetch the complete current state.
    fn fetch(&self) -> BoxFuture<'static, Result<Snapshot, FeedError>>;
}

/// Timing knobs for the fallback behaviour.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// How long to wait for a reconnect before falling back to polling.
    pub degraded_grace: Duration,
    /// Interval between full refreshes while polling.
    pub poll_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            degraded_grace: Duration::from_secs(5),
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Handle to the running feed: the shared store, a health watch, and
/// shutdown.
pub struct StateFeed {
    store: Arc<RwLock<ClientStore>>,
    health: watch::Receiver<FeedHealth>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl StateFeed {
    /// Start the scheduler task and return its handle.
    pub fn spawn(
        transport: Arc<dyn FeedTransport>,
        source: Arc<dyn SnapshotSource>,
        config: FeedConfig,
    ) -> Self {
        let store = Arc::new(RwLock::new(ClientStore::default()));
        let (health_tx, health_rx) = watch::channel(FeedHealth::Connected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            transport,
            source,
            store.clone(),
            health_tx,
            shutdown_rx,
            config,
        ));

        Self {
            store,
            health: health_rx,
            shutdown: shutdown_tx,
            task,
        }
    }

    /// The store the feed keeps up to date.
    pub fn store(&self) -> Arc<RwLock<ClientStore>> {
        self.store.clone()
    }

    /// Watch of the current health state.
    pub fn health(&self) -> watch::Receiver<FeedHealth> {
        self.health.clone()
    }

    /// Stop the scheduler and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

async fn run(
    transport: Arc<dyn FeedTransport>,
    source: Arc<dyn SnapshotSource>,
    store: Arc<RwLock<ClientStore>>,
    health_tx: watch::Sender<FeedHealth>,
    mut shutdown: watch::Receiver<bool>,
    config: FeedConfig,
) {
    let mut conn = transport.connection_watch();
    let mut events = transport.subscribe();

    store.write().await.set_loading(true);
    refresh(&source, &store).await;
    store.write().await.set_loading(false);

    let mut health = if *conn.borrow() {
        FeedHealth::Connected
    } else {
        FeedHealth::Degraded
    };
    publish(&health_tx, health);
    let mut grace_deadline = Instant::now() + config.degraded_grace;

    loop {
        match health {
            FeedHealth::Connected => {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    changed = conn.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if !*conn.borrow() {
                            debug!("realtime stream lost; starting grace period");
                            health = FeedHealth::Degraded;
                            grace_deadline = Instant::now() + config.degraded_grace;
                            publish(&health_tx, health);
                        }
                    }
                    received = events.recv() => match received {
                        Ok(event) => {
                            store.write().await.ingest_realtime_event(event);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Events carry full rows, so one refresh closes
                            // any gap.
                            debug!(skipped, "event receiver lagged; refreshing");
                            refresh(&source, &store).await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            health = FeedHealth::Degraded;
                            grace_deadline = Instant::now() + config.degraded_grace;
                            publish(&health_tx, health);
                        }
                    },
                }
            }
            FeedHealth::Degraded => {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    changed = conn.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *conn.borrow() {
                            events = transport.subscribe();
                            refresh(&source, &store).await;
                            health = FeedHealth::Connected;
                            publish(&health_tx, health);
                        }
                    }
                    _ = sleep_until(grace_deadline) => {
                        debug!("grace period elapsed; falling back to polling");
                        health = FeedHealth::Polling;
                        publish(&health_tx, health);
                        refresh(&source, &store).await;
                    }
                }
            }
            FeedHealth::Polling => {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    changed = conn.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *conn.borrow() {
                            debug!("realtime stream back; leaving polling mode");
                            events = transport.subscribe();
                            refresh(&source, &store).await;
                            health = FeedHealth::Connected;
                            publish(&health_tx, health);
                        }
                    }
                    _ = sleep(config.poll_interval) => {
                        refresh(&source, &store).await;
                    }
                }
            }
        }
    }
}

/// Fetch a snapshot and fold it into the store; failures are surfaced in the
/// store's error slot and retried on the next schedule.
async fn refresh(source: &Arc<dyn SnapshotSource>, store: &Arc<RwLock<ClientStore>>) {
    match source.fetch().await {
        Ok(snapshot) => {
            let mut guard = store.write().await;
            guard.replace_all(snapshot.locker, snapshot.countries);
            guard.set_error(None);
        }
        Err(error) => {
            warn!(%error, "snapshot refresh failed");
            store.write().await.set_error(Some(error.to_string()));
        }
    }
}

fn publish(health_tx: &watch::Sender<FeedHealth>, health: FeedHealth) {
    health_tx.send_if_modified(|current| {
        let changed = *current != health;
        *current = health;
        changed
    });
}
