/// Admin mutation pipeline for country and energy updates.
pub mod admin_service;
/// Best-effort audit log writes.
pub mod audit_service;
/// Token-to-identity resolution for the authority boundary.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Public read-only projections.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervision and degraded-mode recovery.
pub mod storage_supervisor;
