use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/public",
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime locker and country updates to connected viewers.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    info!("New public SSE connection");
    let handshake = sse_service::public_handshake(&state).await;
    sse_service::to_sse_stream(receiver, handshake)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/public", get(public_stream))
}
