//! Keeps the storage backend connected, falling back to degraded mode when
//! it is unreachable and recovering with exponential backoff.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, unlock_store::UnlockStore},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connect to the storage backend, seed the initial rows, and keep the shared
/// state's degraded flag in sync with the connection health. Viewers learn of
/// transitions through the `system.status` broadcast.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn UnlockStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                let codes = state.config().seed_countries().to_vec();
                if let Err(error) = store.seed(codes).await {
                    warn!(error = %error, "storage seeding failed; retrying connection");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                    continue;
                }

                state.install_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                loop {
                    sleep(HEALTH_POLL_INTERVAL).await;
                    if let Err(error) = store.health_check().await {
                        warn!(error = %error, "storage health probe failed; entering degraded mode");
                        state.clear_store().await;
                        break;
                    }
                }
            }
            Err(error) => {
                warn!(error = %error, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
