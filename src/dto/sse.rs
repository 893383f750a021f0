//! Payload types carried across the public SSE stream.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::public::{CountryStateView, LockerStateView};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// Current degraded flag.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the locker singleton changes; carries the full row.
pub struct LockerChangedEvent(pub LockerStateView);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever a country row changes; carries the full row.
pub struct CountryChangedEvent(pub CountryStateView);
