use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// SSE-specific sub-state carved out from [`super::AppState`].
pub struct SseState {
    public: SseHub,
}

impl SseState {
    /// Build the SSE sub-tree with the given channel capacity.
    pub fn new(public_capacity: usize) -> Self {
        Self {
            public: SseHub::new(public_capacity),
        }
    }

    /// Access the public SSE hub used to fan out broadcast events.
    pub fn public(&self) -> &SseHub {
        &self.public
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
