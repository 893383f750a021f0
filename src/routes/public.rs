use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{
        common::ApiResponse,
        public::{CountryStateView, GlobalSnapshotResponse, LockerStateView},
    },
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints exposing the locker and country state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/state", get(global_state))
        .route("/public/locker", get(locker_state))
        .route("/public/countries", get(country_states))
}

#[utoipa::path(
    get,
    path = "/public/state",
    tag = "public",
    responses(
        (status = 200, description = "Full state snapshot", body = GlobalSnapshotResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Return the full snapshot: locker, every country row, and the health flag.
pub async fn global_state(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<GlobalSnapshotResponse>>, AppError> {
    let payload = public_service::snapshot(&state).await?;
    Ok(Json(ApiResponse::ok(payload)))
}

#[utoipa::path(
    get,
    path = "/public/locker",
    tag = "public",
    responses(
        (status = 200, description = "Locker state", body = LockerStateView),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Return the locker singleton on its own.
pub async fn locker_state(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<LockerStateView>>, AppError> {
    let payload = public_service::locker(&state).await?;
    Ok(Json(ApiResponse::ok(payload)))
}

#[utoipa::path(
    get,
    path = "/public/countries",
    tag = "public",
    responses(
        (status = 200, description = "All country rows", body = [CountryStateView]),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Return every country row, ordered by country code.
pub async fn country_states(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<Vec<CountryStateView>>>, AppError> {
    let payload = public_service::countries(&state).await?;
    Ok(Json(ApiResponse::ok(payload)))
}
