//! Persistence layer: entities, the backend-agnostic storage abstraction,
//! and the MongoDB implementation.

/// Database model definitions shared across layers.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Locker/country/audit storage trait and backends.
pub mod unlock_store;
