//! Plumbing between the broadcast hub and axum's SSE response type.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

/// Subscribe to the shared public SSE stream.
pub fn subscribe_public(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.public_sse().subscribe()
}

/// Handshake payload delivered to a freshly connected public subscriber.
pub async fn public_handshake(state: &SharedState) -> ServerEvent {
    let payload = Handshake {
        stream: "public".into(),
        message: "public stream connected".into(),
        degraded: state.is_degraded().await,
    };
    ServerEvent::json(Some("handshake".to_string()), &payload).unwrap_or_else(|_| {
        ServerEvent {
            event: Some("handshake".into()),
            data: "{}".into(),
        }
    })
}

/// Convert a broadcast receiver into an SSE response, sending the handshake
/// first, then forwarding events until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    handshake: ServerEvent,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        if tx.send(Ok(to_event(handshake))).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive;
                            // every event carries the full row so the next
                            // one corrects the gap.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!("Public SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
