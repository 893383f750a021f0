//! Typed helpers that turn committed state changes into public SSE events.
//! Every event carries the complete row, so a subscriber that misses one is
//! corrected by the next.

use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::{CountryStateEntity, LockerStateEntity},
    dto::sse::{CountryChangedEvent, LockerChangedEvent, ServerEvent, SystemStatus},
    state::SharedState,
};

const EVENT_LOCKER_CHANGED: &str = "locker.changed";
const EVENT_COUNTRY_CHANGED: &str = "country.changed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the updated locker row to all public subscribers.
pub fn broadcast_locker_changed(state: &SharedState, locker: &LockerStateEntity) {
    let payload = LockerChangedEvent(locker.clone().into());
    send_public_event(state, EVENT_LOCKER_CHANGED, &payload);
}

/// Broadcast an updated country row to all public subscribers.
pub fn broadcast_country_changed(state: &SharedState, country: &CountryStateEntity) {
    let payload = CountryChangedEvent(country.clone().into());
    send_public_event(state, EVENT_COUNTRY_CHANGED, &payload);
}

/// Broadcast the degraded flag whenever it flips.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_SYSTEM_STATUS, &payload);
}

/// Watch degraded-mode transitions and announce each one as a
/// `system.status` event. Runs until the state is dropped.
pub fn spawn_status_broadcaster(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let degraded = *watcher.borrow_and_update();
            broadcast_system_status(&state, degraded);
        }
    });
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
