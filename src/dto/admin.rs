//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::{AuditActionType, AuditEntryEntity};
use crate::dto::format_system_time;

/// How an update value is applied to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Add the value to the current count/percentage.
    Increment,
    /// Replace the current count/percentage with the value.
    Absolute,
}

/// Request to change one country's activation count.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = crate::dto::validation::validate_country_update))]
pub struct CountryUpdateRequest {
    /// ISO 3166-1 alpha-2 code, case-insensitive.
    #[validate(custom(function = crate::dto::validation::validate_country_code))]
    pub country_code: String,
    /// Whether `value` is a delta or a replacement.
    pub mode: UpdateMode,
    /// Positive delta (increment) or non-negative replacement (absolute).
    pub value: i64,
    /// Optional free-text note recorded in the audit log.
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Request to change the global energy percentage.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = crate::dto::validation::validate_energy_update))]
pub struct EnergyUpdateRequest {
    /// Whether `value` is a delta or a replacement.
    pub mode: UpdateMode,
    /// Positive delta (increment) or replacement within `[0, 100]` (absolute).
    pub value: i64,
    /// Optional free-text note recorded in the audit log.
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// One audit log entry as returned to administrators.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditEntryView {
    /// Stable identifier for the entry.
    pub id: uuid::Uuid,
    /// Email of the admin who issued the mutation.
    pub admin_email: String,
    /// What kind of mutation this records.
    pub action_type: AuditActionType,
    /// Country code or the global-energy marker.
    pub subject: String,
    /// Human-readable descriptor, e.g. `+3` or `set to 42%`.
    pub delta_or_value: String,
    /// Optional note supplied with the mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// RFC 3339 timestamp of the entry.
    pub recorded_at: String,
}

impl From<AuditEntryEntity> for AuditEntryView {
    fn from(value: AuditEntryEntity) -> Self {
        Self {
            id: value.id,
            admin_email: value.admin_email,
            action_type: value.action_type,
            subject: value.subject,
            delta_or_value: value.delta_or_value,
            note: value.note,
            recorded_at: format_system_time(value.recorded_at),
        }
    }
}

/// Query parameters accepted by the audit listing endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditQuery {
    /// Maximum number of entries to return (default 50, capped at 500).
    pub limit: Option<i64>,
}
