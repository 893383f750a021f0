//! Unlock Map Back binary entrypoint wiring REST, SSE, and MongoDB layers.

use std::{env, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unlock_map_back::{
    config::AppConfig,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    unlock_map_back::services::sse_events::spawn_status_broadcaster(app_state.clone());
    spawn_storage_supervisor(app_state.clone());

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Run the MongoDB connection supervisor in the background. Until it
/// succeeds the backend serves in degraded mode.
#[cfg(feature = "mongo-store")]
fn spawn_storage_supervisor(state: SharedState) {
    use std::sync::Arc;

    use unlock_map_back::dao::{
        storage::StorageError,
        unlock_store::{UnlockStore, mongodb::MongoUnlockStore},
    };
    use unlock_map_back::services::storage_supervisor;

    let mongo_uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let mongo_db = env::var("MONGO_DB").ok();

    let connect = move || {
        let uri = mongo_uri.clone();
        let db_name = mongo_db.clone();
        async move {
            let store = MongoUnlockStore::connect(&uri, db_name.as_deref())
                .await
                .map_err(StorageError::from)?;
            Ok(Arc::new(store) as Arc<dyn UnlockStore>)
        }
    };

    tokio::spawn(storage_supervisor::run(state, connect));
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_storage_supervisor(_state: SharedState) {
    tracing::warn!("no storage backend compiled in; serving in degraded mode");
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
