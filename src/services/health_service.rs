//! Liveness reporting backed by the storage probe.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `ok` when a storage backend is installed and answering pings,
/// `degraded` otherwise. Never fails; degraded is a valid running state.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.store().await else {
        return HealthResponse::degraded();
    };
    match store.health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(error) => {
            warn!(%error, "storage health probe failed");
            HealthResponse::degraded()
        }
    }
}
