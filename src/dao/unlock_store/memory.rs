//! In-memory [`UnlockStore`] used by unit tests. Mirrors the conditional
//! write semantics of the real backend and exposes a few knobs for failure
//! injection and post-hoc assertions.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};

use futures::future::BoxFuture;

use crate::dao::models::{
    AuditEntryEntity, CountryStateEntity, CountryWrite, LockerStateEntity, LockerWrite,
};
use crate::dao::storage::{StorageError, StorageResult};
use crate::dao::unlock_store::UnlockStore;

#[derive(Default)]
struct Inner {
    locker: Option<LockerStateEntity>,
    countries: BTreeMap<String, CountryStateEntity>,
    audit: Vec<AuditEntryEntity>,
    fail_audit: bool,
    conflict_next_write: bool,
    fetches: usize,
    writes: usize,
}

/// Cloneable handle over shared in-memory state.
#[derive(Clone, Default)]
pub struct MemoryUnlockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryUnlockStore {
    /// Build a store holding a zeroed locker and zeroed rows for `codes`.
    pub fn seeded(codes: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.locker = Some(LockerStateEntity {
                energy_percentage: 0,
                is_unlocked: false,
                last_updated: SystemTime::now(),
            });
            for code in codes {
                inner.countries.insert(
                    (*code).to_string(),
                    CountryStateEntity {
                        country_code: (*code).to_string(),
                        activation_count: 0,
                        glow_band: 0,
                        last_updated: SystemTime::now(),
                    },
                );
            }
        }
        store
    }

    pub fn set_locker(&self, energy_percentage: i32, is_unlocked: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.locker = Some(LockerStateEntity {
            energy_percentage,
            is_unlocked,
            last_updated: SystemTime::now(),
        });
    }

    pub fn set_country_count(&self, code: &str, activation_count: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.countries.get_mut(code) {
            row.activation_count = activation_count;
            row.glow_band = crate::domain::glow_band_of(activation_count);
            row.last_updated = SystemTime::now();
        }
    }

    /// Make every subsequent audit append fail.
    pub fn fail_audit_appends(&self) {
        self.inner.lock().unwrap().fail_audit = true;
    }

    /// Make the next conditional write miss, as if another writer raced in.
    pub fn force_conflict_on_next_write(&self) {
        self.inner.lock().unwrap().conflict_next_write = true;
    }

    pub fn audit_entries(&self) -> Vec<AuditEntryEntity> {
        self.inner.lock().unwrap().audit.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.lock().unwrap().fetches
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes
    }
}

impl UnlockStore for MemoryUnlockStore {
    fn fetch_locker(&self) -> BoxFuture<'static, StorageResult<Option<LockerStateEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut inner = inner.lock().unwrap();
            inner.fetches += 1;
            Ok(inner.locker.clone())
        })
    }

    fn update_locker(
        &self,
        write: LockerWrite,
    ) -> BoxFuture<'static, StorageResult<Option<LockerStateEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut inner = inner.lock().unwrap();
            if std::mem::take(&mut inner.conflict_next_write) {
                return Ok(None);
            }
            let Some(current) = inner.locker.clone() else {
                return Ok(None);
            };
            if current.last_updated != write.expected_last_updated {
                return Ok(None);
            }
            let next = LockerStateEntity {
                energy_percentage: write.energy_percentage,
                is_unlocked: write.is_unlocked,
                last_updated: write.last_updated,
            };
            inner.locker = Some(next.clone());
            inner.writes += 1;
            Ok(Some(next))
        })
    }

    fn fetch_country(
        &self,
        country_code: String,
    ) -> BoxFuture<'static, StorageResult<Option<CountryStateEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut inner = inner.lock().unwrap();
            inner.fetches += 1;
            Ok(inner.countries.get(&country_code).cloned())
        })
    }

    fn update_country(
        &self,
        country_code: String,
        write: CountryWrite,
    ) -> BoxFuture<'static, StorageResult<Option<CountryStateEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut inner = inner.lock().unwrap();
            if std::mem::take(&mut inner.conflict_next_write) {
                return Ok(None);
            }
            let Some(current) = inner.countries.get(&country_code) else {
                return Ok(None);
            };
            if current.last_updated != write.expected_last_updated {
                return Ok(None);
            }
            let next = CountryStateEntity {
                country_code: country_code.clone(),
                activation_count: write.activation_count,
                glow_band: write.glow_band,
                last_updated: write.last_updated,
            };
            inner.countries.insert(country_code, next.clone());
            inner.writes += 1;
            Ok(Some(next))
        })
    }

    fn list_countries(&self) -> BoxFuture<'static, StorageResult<Vec<CountryStateEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let inner = inner.lock().unwrap();
            Ok(inner.countries.values().cloned().collect())
        })
    }

    fn append_audit(&self, entry: AuditEntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut inner = inner.lock().unwrap();
            if inner.fail_audit {
                return Err(StorageError::unavailable(
                    "audit append failed".into(),
                    std::io::Error::other("injected failure"),
                ));
            }
            inner.audit.push(entry);
            Ok(())
        })
    }

    fn list_audit(&self, limit: i64) -> BoxFuture<'static, StorageResult<Vec<AuditEntryEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let inner = inner.lock().unwrap();
            let mut entries = inner.audit.clone();
            entries.reverse();
            entries.truncate(limit.max(0) as usize);
            Ok(entries)
        })
    }

    fn seed(&self, country_codes: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut inner = inner.lock().unwrap();
            if inner.locker.is_none() {
                inner.locker = Some(LockerStateEntity {
                    energy_percentage: 0,
                    is_unlocked: false,
                    last_updated: SystemTime::now(),
                });
            }
            for code in country_codes {
                inner
                    .countries
                    .entry(code.clone())
                    .or_insert_with(|| CountryStateEntity {
                        country_code: code,
                        activation_count: 0,
                        glow_band: 0,
                        last_updated: SystemTime::now(),
                    });
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
