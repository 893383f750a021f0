//! Best-effort audit log writes. Entries are appended on a spawned task
//! after the primary mutation has committed; a failed append is logged and
//! never reaches the mutation's caller.

use std::time::SystemTime;

use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{AuditActionType, AuditEntryEntity, GLOBAL_ENERGY_SUBJECT},
    dto::admin::{CountryUpdateRequest, EnergyUpdateRequest, UpdateMode},
    services::auth_service::AdminIdentity,
    state::SharedState,
};

/// Fire-and-forget append of an audit entry.
pub fn record(state: &SharedState, entry: AuditEntryEntity) {
    let state = state.clone();
    tokio::spawn(async move {
        let Some(store) = state.store().await else {
            warn!(
                subject = %entry.subject,
                "audit entry dropped; storage unavailable"
            );
            return;
        };
        if let Err(err) = store.append_audit(entry.clone()).await {
            warn!(
                error = %err,
                admin = %entry.admin_email,
                subject = %entry.subject,
                "failed to append audit entry"
            );
        }
    });
}

/// Build the audit entry for a committed country mutation.
pub fn country_entry(
    identity: &AdminIdentity,
    request: &CountryUpdateRequest,
    country_code: &str,
) -> AuditEntryEntity {
    let (action_type, delta_or_value) = match request.mode {
        UpdateMode::Increment => (
            AuditActionType::CountryIncrement,
            format!("+{}", request.value),
        ),
        UpdateMode::Absolute => (AuditActionType::CountrySet, format!("set to {}", request.value)),
    };

    AuditEntryEntity {
        id: Uuid::new_v4(),
        admin_email: identity.email.clone(),
        action_type,
        subject: country_code.to_owned(),
        delta_or_value,
        note: request.note.clone(),
        recorded_at: SystemTime::now(),
    }
}

/// Build the audit entry for a committed energy mutation.
pub fn energy_entry(identity: &AdminIdentity, request: &EnergyUpdateRequest) -> AuditEntryEntity {
    let (action_type, delta_or_value) = match request.mode {
        UpdateMode::Increment => (
            AuditActionType::EnergyIncrement,
            format!("+{}%", request.value),
        ),
        UpdateMode::Absolute => (
            AuditActionType::EnergySet,
            format!("set to {}%", request.value),
        ),
    };

    AuditEntryEntity {
        id: Uuid::new_v4(),
        admin_email: identity.email.clone(),
        action_type,
        subject: GLOBAL_ENERGY_SUBJECT.to_owned(),
        delta_or_value,
        note: request.note.clone(),
        recorded_at: SystemTime::now(),
    }
}
