//! Storage abstraction for the locker singleton, country rows, and the audit
//! log.

#[cfg(test)]
pub(crate) mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::models::{
    AuditEntryEntity, CountryStateEntity, CountryWrite, LockerStateEntity, LockerWrite,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for locker and country state.
///
/// Updates are conditional: the backend must only apply the write when the
/// row's `last_updated` still equals the `expected_last_updated` carried in
/// the write, and must return the post-image. `Ok(None)` from an update means
/// the condition (or the key) matched nothing; the caller decides whether
/// that is a missing row or a concurrent modification.
pub trait UnlockStore: Send + Sync {
    /// Fetch the locker singleton.
    fn fetch_locker(&self) -> BoxFuture<'static, StorageResult<Option<LockerStateEntity>>>;
    /// Conditionally update the locker singleton, returning the new row.
    fn update_locker(
        &self,
        write: LockerWrite,
    ) -> BoxFuture<'static, StorageResult<Option<LockerStateEntity>>>;
    /// Fetch one country row by upper-case code.
    fn fetch_country(
        &self,
        country_code: String,
    ) -> BoxFuture<'static, StorageResult<Option<CountryStateEntity>>>;
    /// Conditionally update one country row, returning the new row.
    fn update_country(
        &self,
        country_code: String,
        write: CountryWrite,
    ) -> BoxFuture<'static, StorageResult<Option<CountryStateEntity>>>;
    /// List every country row, ordered by country code.
    fn list_countries(&self) -> BoxFuture<'static, StorageResult<Vec<CountryStateEntity>>>;
    /// Append an audit entry.
    fn append_audit(&self, entry: AuditEntryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// List the most recent audit entries, newest first.
    fn list_audit(&self, limit: i64) -> BoxFuture<'static, StorageResult<Vec<AuditEntryEntity>>>;
    /// Idempotently create the locker singleton and zeroed country rows for
    /// the given codes. Existing rows are left untouched.
    fn seed(&self, country_codes: Vec<String>) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
