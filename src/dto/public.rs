//! Read-only projections served to public viewers.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::{CountryStateEntity, LockerStateEntity};
use crate::dto::format_system_time;

/// The locker singleton as seen by viewers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LockerStateView {
    /// Global energy in `[0, 100]`.
    pub energy_percentage: i32,
    /// Whether the bonus content is unlocked.
    pub is_unlocked: bool,
    /// RFC 3339 timestamp of the last successful mutation.
    pub last_updated: String,
}

impl From<LockerStateEntity> for LockerStateView {
    fn from(value: LockerStateEntity) -> Self {
        Self {
            energy_percentage: value.energy_percentage,
            is_unlocked: value.is_unlocked,
            last_updated: format_system_time(value.last_updated),
        }
    }
}

/// One country row as seen by viewers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CountryStateView {
    /// Upper-case ISO 3166-1 alpha-2 code.
    pub country_code: String,
    /// Admin-entered activation counter.
    pub activation_count: i64,
    /// Display tier (0-3) derived from the count.
    pub glow_band: i32,
    /// RFC 3339 timestamp of the last successful mutation.
    pub last_updated: String,
}

impl From<CountryStateEntity> for CountryStateView {
    fn from(value: CountryStateEntity) -> Self {
        Self {
            country_code: value.country_code,
            activation_count: value.activation_count,
            glow_band: value.glow_band,
            last_updated: format_system_time(value.last_updated),
        }
    }
}

/// Full state snapshot: the startup fetch and the polling fallback payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct GlobalSnapshotResponse {
    /// The locker singleton.
    pub locker: LockerStateView,
    /// Every country row, ordered by country code.
    pub countries: Vec<CountryStateView>,
    /// True when the backend is running without a storage connection.
    pub degraded: bool,
}
