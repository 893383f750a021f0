//! Entities shared between the storage backends, the mutation service, and
//! the client-side state store.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Marker used as the audit `subject` for global energy mutations.
pub const GLOBAL_ENERGY_SUBJECT: &str = "global_energy";

/// The singleton locker row tracking global energy and the unlock flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockerStateEntity {
    /// Global energy in `[0, 100]`.
    pub energy_percentage: i32,
    /// Flips to `true` exactly once when energy first reaches 100.
    pub is_unlocked: bool,
    /// Set on every successful mutation; also the compare-and-swap token.
    pub last_updated: SystemTime,
}

/// Per-country activation state, keyed by upper-case ISO alpha-2 code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryStateEntity {
    /// Upper-case ISO 3166-1 alpha-2 code.
    pub country_code: String,
    /// Admin-entered activation counter, never negative.
    pub activation_count: i64,
    /// Display tier derived from the count via [`crate::domain::glow_band_of`].
    pub glow_band: i32,
    /// Set on every successful mutation; also the compare-and-swap token.
    pub last_updated: SystemTime,
}

/// Classifies an audit entry by the mutation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditActionType {
    /// Country activation incremented by a delta.
    CountryIncrement,
    /// Country activation set to an absolute value.
    CountrySet,
    /// Global energy incremented by a delta.
    EnergyIncrement,
    /// Global energy set to an absolute value.
    EnergySet,
}

/// Append-only record of an admin mutation, written best-effort after the
/// primary write commits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntryEntity {
    /// Stable identifier for the entry.
    pub id: Uuid,
    /// Email of the admin who issued the mutation.
    pub admin_email: String,
    /// What kind of mutation this records.
    pub action_type: AuditActionType,
    /// Country code, or [`GLOBAL_ENERGY_SUBJECT`] for energy mutations.
    pub subject: String,
    /// Human-readable descriptor, e.g. `+3` or `set to 42%`.
    pub delta_or_value: String,
    /// Optional free-text note supplied by the admin (max 500 chars).
    pub note: Option<String>,
    /// When the entry was recorded.
    pub recorded_at: SystemTime,
}

/// Fields written by a locker mutation, plus the CAS token read beforehand.
#[derive(Debug, Clone)]
pub struct LockerWrite {
    /// New energy percentage.
    pub energy_percentage: i32,
    /// New unlock flag (never transitions back to `false`).
    pub is_unlocked: bool,
    /// Timestamp of this mutation.
    pub last_updated: SystemTime,
    /// `last_updated` observed during the fetch; the write only applies if
    /// the row still carries this value.
    pub expected_last_updated: SystemTime,
}

/// Fields written by a country mutation, plus the CAS token read beforehand.
#[derive(Debug, Clone)]
pub struct CountryWrite {
    /// New activation count.
    pub activation_count: i64,
    /// Glow band recomputed from the new count.
    pub glow_band: i32,
    /// Timestamp of this mutation.
    pub last_updated: SystemTime,
    /// `last_updated` observed during the fetch; the write only applies if
    /// the row still carries this value.
    pub expected_last_updated: SystemTime,
}
