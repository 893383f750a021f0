use axum::{
    Json, Router,
    body::Body,
    extract::{Extension, Query, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use crate::{
    dto::{
        admin::{AuditEntryView, AuditQuery, CountryUpdateRequest, EnergyUpdateRequest},
        common::ApiResponse,
        public::{CountryStateView, LockerStateView},
    },
    error::AppError,
    services::{admin_service, auth_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only endpoints mutating the locker and country state.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/country", post(update_country))
        .route("/admin/energy", post(update_energy))
        .route("/admin/audit", get(audit_log))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

#[utoipa::path(
    post,
    path = "/admin/country",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token from the operator configuration")),
    request_body = CountryUpdateRequest,
    responses(
        (status = 200, description = "Country updated", body = CountryStateView),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Unknown country code"),
        (status = 409, description = "Concurrent modification; retry")
    )
)]
/// Apply an increment or absolute set to one country's activation count.
pub async fn update_country(
    State(state): State<SharedState>,
    Extension(identity): Extension<auth_service::AdminIdentity>,
    Json(payload): Json<CountryUpdateRequest>,
) -> Result<Json<ApiResponse<CountryStateView>>, AppError> {
    let view = admin_service::apply_country_update(&state, &identity, payload).await?;
    Ok(Json(ApiResponse::ok(view)))
}

#[utoipa::path(
    post,
    path = "/admin/energy",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token from the operator configuration")),
    request_body = EnergyUpdateRequest,
    responses(
        (status = 200, description = "Energy updated", body = LockerStateView),
        (status = 400, description = "Validation failed or unlock already complete"),
        (status = 409, description = "Concurrent modification; retry")
    )
)]
/// Apply an increment or absolute set to the global energy percentage.
pub async fn update_energy(
    State(state): State<SharedState>,
    Extension(identity): Extension<auth_service::AdminIdentity>,
    Json(payload): Json<EnergyUpdateRequest>,
) -> Result<Json<ApiResponse<LockerStateView>>, AppError> {
    let view = admin_service::apply_energy_update(&state, &identity, payload).await?;
    Ok(Json(ApiResponse::ok(view)))
}

#[utoipa::path(
    get,
    path = "/admin/audit",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin token from the operator configuration"),
        ("limit" = Option<i64>, Query, description = "Maximum number of entries (default 50, capped at 500)")
    ),
    responses((status = 200, description = "Most recent audit entries, newest first", body = [AuditEntryView]))
)]
/// List the most recent audit log entries.
pub async fn audit_log(
    State(state): State<SharedState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ApiResponse<Vec<AuditEntryView>>>, AppError> {
    let entries = admin_service::list_audit(&state, query.limit).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// Resolve the `X-Admin-Token` header to an identity before any admin
/// handler runs, and stash it in the request extensions for audit use.
async fn require_admin_token(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    let identity = auth_service::authenticate_admin(&state, provided)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
