use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Unlock Map Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::global_state,
        crate::routes::public::locker_state,
        crate::routes::public::country_states,
        crate::routes::admin::update_country,
        crate::routes::admin::update_energy,
        crate::routes::admin::audit_log,
        crate::routes::sse::public_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::public::LockerStateView,
            crate::dto::public::CountryStateView,
            crate::dto::public::GlobalSnapshotResponse,
            crate::dto::admin::CountryUpdateRequest,
            crate::dto::admin::EnergyUpdateRequest,
            crate::dto::admin::AuditEntryView,
            crate::dto::admin::UpdateMode,
            crate::dao::models::AuditActionType,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Read-only state for viewers"),
        (name = "admin", description = "Token-protected state mutations"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
