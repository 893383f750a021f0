//! Read-only projections for the public routes.

use crate::{
    dto::public::{CountryStateView, GlobalSnapshotResponse, LockerStateView},
    error::ServiceError,
    state::SharedState,
};

/// Build the full state snapshot served on startup and as a polling fallback.
pub async fn snapshot(state: &SharedState) -> Result<GlobalSnapshotResponse, ServiceError> {
    let store = state.require_store().await?;
    let locker = store
        .fetch_locker()
        .await?
        .ok_or_else(|| ServiceError::NotFound("locker state not found".into()))?;
    let countries = store.list_countries().await?;

    Ok(GlobalSnapshotResponse {
        locker: locker.into(),
        countries: countries.into_iter().map(Into::into).collect(),
        degraded: state.is_degraded().await,
    })
}

/// Fetch the locker singleton on its own.
pub async fn locker(state: &SharedState) -> Result<LockerStateView, ServiceError> {
    let store = state.require_store().await?;
    let locker = store
        .fetch_locker()
        .await?
        .ok_or_else(|| ServiceError::NotFound("locker state not found".into()))?;
    Ok(locker.into())
}

/// List every country row, ordered by country code.
pub async fn countries(state: &SharedState) -> Result<Vec<CountryStateView>, ServiceError> {
    let store = state.require_store().await?;
    let countries = store.list_countries().await?;
    Ok(countries.into_iter().map(Into::into).collect())
}
