//! Shared application state: the installed storage backend, the degraded
//! flag, and the SSE broadcast hub.

mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::unlock_store::UnlockStore, error::ServiceError};

pub use self::sse::SseHub;
use self::sse::SseState;

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Broadcast capacity of the public SSE hub.
const PUBLIC_SSE_CAPACITY: usize = 32;

/// Central application state storing the storage handle and broadcast hubs.
pub struct AppState {
    store: RwLock<Option<Arc<dyn UnlockStore>>>,
    sse: SseState,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            sse: SseState::new(PUBLIC_SSE_CAPACITY),
            degraded: degraded_tx,
            config,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn UnlockStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the store or fail with [`ServiceError::Degraded`].
    pub async fn require_store(&self) -> Result<Arc<dyn UnlockStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn UnlockStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}
