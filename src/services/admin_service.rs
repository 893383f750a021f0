//! Business logic powering the admin REST routes: the mutation pipeline for
//! country activation and global energy. Each operation follows the same
//! shape: validate, fetch the current row, derive the new values, apply a
//! conditional write, then audit and broadcast best-effort.

use std::time::SystemTime;

use tracing::debug;
use validator::Validate;

use crate::{
    dao::models::{CountryWrite, LockerWrite},
    domain::{UNLOCK_THRESHOLD, crosses_unlock_threshold, glow_band_of},
    dto::{
        admin::{AuditEntryView, CountryUpdateRequest, EnergyUpdateRequest, UpdateMode},
        public::{CountryStateView, LockerStateView},
    },
    error::ServiceError,
    services::{audit_service, auth_service::AdminIdentity, sse_events},
    state::SharedState,
};

/// Default and maximum page sizes for the audit listing.
const AUDIT_DEFAULT_LIMIT: i64 = 50;
const AUDIT_MAX_LIMIT: i64 = 500;

/// Apply a validated country update and return the new row.
///
/// Increment mode adds to the current count (no upper clamp); absolute mode
/// replaces it. The glow band is always recomputed from the new count;
/// there is no other derivation path.
pub async fn apply_country_update(
    state: &SharedState,
    identity: &AdminIdentity,
    request: CountryUpdateRequest,
) -> Result<CountryStateView, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    let country_code = request.country_code.to_ascii_uppercase();

    let current = store
        .fetch_country(country_code.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("country `{country_code}` not found")))?;

    let next_count = match request.mode {
        UpdateMode::Increment => current.activation_count.saturating_add(request.value),
        UpdateMode::Absolute => request.value,
    };

    let write = CountryWrite {
        activation_count: next_count,
        glow_band: glow_band_of(next_count),
        last_updated: SystemTime::now(),
        expected_last_updated: current.last_updated,
    };

    let updated = store
        .update_country(country_code.clone(), write)
        .await?
        .ok_or_else(|| {
            ServiceError::WriteConflict(format!(
                "country `{country_code}` changed concurrently; retry"
            ))
        })?;

    debug!(
        admin = %identity.email,
        country = %country_code,
        count = updated.activation_count,
        band = updated.glow_band,
        "country updated"
    );

    audit_service::record(
        state,
        audit_service::country_entry(identity, &request, &country_code),
    );
    sse_events::broadcast_country_changed(state, &updated);

    Ok(updated.into())
}

/// Apply a validated energy update and return the new locker row.
///
/// Increment mode clamps at 100 and is rejected outright once the locker is
/// unlocked, re-checked here against the fresh row even though callers
/// usually pre-check, since the flag may have flipped since they looked.
/// Absolute mode remains permitted after unlock, but the flag itself never
/// transitions back.
pub async fn apply_energy_update(
    state: &SharedState,
    identity: &AdminIdentity,
    request: EnergyUpdateRequest,
) -> Result<LockerStateView, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;

    let current = store
        .fetch_locker()
        .await?
        .ok_or_else(|| ServiceError::NotFound("locker state not found".into()))?;

    if request.mode == UpdateMode::Increment && current.is_unlocked {
        return Err(ServiceError::UnlockComplete);
    }

    let next_percentage = match request.mode {
        UpdateMode::Increment => {
            let raw = i64::from(current.energy_percentage).saturating_add(request.value);
            raw.min(i64::from(UNLOCK_THRESHOLD)) as i32
        }
        UpdateMode::Absolute => request.value as i32,
    };

    let should_unlock = crosses_unlock_threshold(current.energy_percentage, next_percentage)
        && !current.is_unlocked;

    let write = LockerWrite {
        energy_percentage: next_percentage,
        is_unlocked: should_unlock || current.is_unlocked,
        last_updated: SystemTime::now(),
        expected_last_updated: current.last_updated,
    };

    let updated = store.update_locker(write).await?.ok_or_else(|| {
        ServiceError::WriteConflict("locker state changed concurrently; retry".into())
    })?;

    debug!(
        admin = %identity.email,
        energy = updated.energy_percentage,
        unlocked = updated.is_unlocked,
        "energy updated"
    );

    audit_service::record(state, audit_service::energy_entry(identity, &request));
    sse_events::broadcast_locker_changed(state, &updated);

    Ok(updated.into())
}

/// Return the most recent audit entries, newest first.
pub async fn list_audit(
    state: &SharedState,
    limit: Option<i64>,
) -> Result<Vec<AuditEntryView>, ServiceError> {
    let store = state.require_store().await?;
    let limit = limit.unwrap_or(AUDIT_DEFAULT_LIMIT).clamp(1, AUDIT_MAX_LIMIT);
    let entries = store.list_audit(limit).await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::AuditActionType, unlock_store::memory::MemoryUnlockStore},
        state::AppState,
    };

    fn identity() -> AdminIdentity {
        AdminIdentity {
            email: "ops@example.com".into(),
        }
    }

    async fn state_with_store(store: MemoryUnlockStore) -> SharedState {
        let state = AppState::new(AppConfig::for_tests(Vec::new()));
        state.install_store(Arc::new(store)).await;
        state
    }

    fn country_request(code: &str, mode: UpdateMode, value: i64) -> CountryUpdateRequest {
        CountryUpdateRequest {
            country_code: code.into(),
            mode,
            value,
            note: None,
        }
    }

    fn energy_request(mode: UpdateMode, value: i64) -> EnergyUpdateRequest {
        EnergyUpdateRequest {
            mode,
            value,
            note: None,
        }
    }

    #[tokio::test]
    async fn increment_recomputes_glow_band() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        store.set_country_count("AU", 4);
        let state = state_with_store(store).await;

        let view = apply_country_update(
            &state,
            &identity(),
            country_request("AU", UpdateMode::Increment, 3),
        )
        .await
        .unwrap();

        assert_eq!(view.activation_count, 7);
        assert_eq!(view.glow_band, 3);
    }

    #[tokio::test]
    async fn increment_crossing_band_boundary() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        store.set_country_count("AU", 2);
        let state = state_with_store(store).await;

        let view = apply_country_update(
            &state,
            &identity(),
            country_request("AU", UpdateMode::Increment, 1),
        )
        .await
        .unwrap();

        assert_eq!(view.activation_count, 3);
        assert_eq!(view.glow_band, 2);
    }

    #[tokio::test]
    async fn absolute_zero_resets_glow_band() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        store.set_country_count("AU", 9);
        let state = state_with_store(store).await;

        let view = apply_country_update(
            &state,
            &identity(),
            country_request("AU", UpdateMode::Absolute, 0),
        )
        .await
        .unwrap();

        assert_eq!(view.activation_count, 0);
        assert_eq!(view.glow_band, 0);
    }

    #[tokio::test]
    async fn lowercase_codes_are_normalized() {
        let store = MemoryUnlockStore::seeded(&["FR"]);
        let state = state_with_store(store).await;

        let view = apply_country_update(
            &state,
            &identity(),
            country_request("fr", UpdateMode::Increment, 1),
        )
        .await
        .unwrap();

        assert_eq!(view.country_code, "FR");
    }

    #[tokio::test]
    async fn unknown_country_is_not_found_and_writes_nothing() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        let probe = store.clone();
        let state = state_with_store(store).await;

        let err = apply_country_update(
            &state,
            &identity(),
            country_request("XX", UpdateMode::Increment, 1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_store() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        let probe = store.clone();
        let state = state_with_store(store).await;

        let err = apply_country_update(
            &state,
            &identity(),
            country_request("AU", UpdateMode::Increment, 0),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(probe.fetch_count(), 0);
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn energy_increment_clamps_at_threshold_and_unlocks() {
        let store = MemoryUnlockStore::seeded(&[]);
        store.set_locker(95, false);
        let state = state_with_store(store).await;

        let view = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Increment, 10),
        )
        .await
        .unwrap();

        assert_eq!(view.energy_percentage, 100);
        assert!(view.is_unlocked);
    }

    #[tokio::test]
    async fn huge_energy_increment_still_clamps_at_threshold() {
        let store = MemoryUnlockStore::seeded(&[]);
        store.set_locker(50, false);
        let state = state_with_store(store).await;

        let view = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Increment, i64::MAX),
        )
        .await
        .unwrap();

        assert_eq!(view.energy_percentage, 100);
        assert!(view.is_unlocked);
    }

    #[tokio::test]
    async fn post_unlock_increments_are_rejected() {
        let store = MemoryUnlockStore::seeded(&[]);
        store.set_locker(100, true);
        let probe = store.clone();
        let state = state_with_store(store).await;

        let err = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Increment, 5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::UnlockComplete));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn absolute_set_remains_permitted_after_unlock() {
        let store = MemoryUnlockStore::seeded(&[]);
        store.set_locker(100, true);
        let state = state_with_store(store).await;

        let view = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Absolute, 42),
        )
        .await
        .unwrap();

        // Forced downward by explicit absolute set; the unlock flag is
        // terminal and survives.
        assert_eq!(view.energy_percentage, 42);
        assert!(view.is_unlocked);
    }

    #[tokio::test]
    async fn absolute_set_to_threshold_unlocks_once() {
        let store = MemoryUnlockStore::seeded(&[]);
        store.set_locker(80, false);
        let state = state_with_store(store).await;

        let view = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Absolute, 100),
        )
        .await
        .unwrap();

        assert_eq!(view.energy_percentage, 100);
        assert!(view.is_unlocked);
    }

    #[tokio::test]
    async fn stale_write_surfaces_as_conflict() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        store.force_conflict_on_next_write();
        let state = state_with_store(store).await;

        let err = apply_country_update(
            &state,
            &identity(),
            country_request("AU", UpdateMode::Increment, 1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::WriteConflict(_)));
    }

    #[tokio::test]
    async fn audit_entry_is_recorded_after_commit() {
        let store = MemoryUnlockStore::seeded(&["AU"]);
        let probe = store.clone();
        let state = state_with_store(store).await;

        let mut request = country_request("AU", UpdateMode::Increment, 3);
        request.note = Some("launch day".into());
        apply_country_update(&state, &identity(), request)
            .await
            .unwrap();

        // The append runs on a spawned task; give it a beat to land.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let entries = probe.audit_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_type, AuditActionType::CountryIncrement);
        assert_eq!(entries[0].subject, "AU");
        assert_eq!(entries[0].delta_or_value, "+3");
        assert_eq!(entries[0].note.as_deref(), Some("launch day"));
        assert_eq!(entries[0].admin_email, "ops@example.com");
    }

    #[tokio::test]
    async fn audit_failure_leaves_the_mutation_response_intact() {
        let store = MemoryUnlockStore::seeded(&[]);
        store.set_locker(10, false);
        store.fail_audit_appends();
        let probe = store.clone();
        let state = state_with_store(store).await;

        let view = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Increment, 5),
        )
        .await
        .unwrap();

        assert_eq!(view.energy_percentage, 15);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(probe.audit_entries().is_empty());
    }

    #[tokio::test]
    async fn mutations_are_broadcast_to_public_subscribers() {
        let store = MemoryUnlockStore::seeded(&["BR"]);
        let state = state_with_store(store).await;
        let mut receiver = state.public_sse().subscribe();

        apply_country_update(
            &state,
            &identity(),
            country_request("BR", UpdateMode::Increment, 2),
        )
        .await
        .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("country.changed"));
        assert!(event.data.contains("\"BR\""));
    }

    #[tokio::test]
    async fn degraded_mode_rejects_mutations() {
        let state = AppState::new(AppConfig::for_tests(Vec::new()));

        let err = apply_energy_update(
            &state,
            &identity(),
            energy_request(UpdateMode::Increment, 5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Degraded));
    }
}
