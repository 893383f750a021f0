use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    connection::{MongoConfig, establish_connection},
    error::{MongoDaoError, MongoResult},
    models::{LOCKER_DOC_ID, MongoAuditDocument, MongoCountryDocument, MongoLockerDocument},
};
use crate::dao::{
    models::{
        AuditEntryEntity, CountryStateEntity, CountryWrite, LockerStateEntity, LockerWrite,
    },
    storage::StorageResult,
    unlock_store::UnlockStore,
};

const LOCKER_COLLECTION_NAME: &str = "locker_state";
const COUNTRY_COLLECTION_NAME: &str = "country_states";
const AUDIT_COLLECTION_NAME: &str = "audit_log";

/// Mongo-backed unlock store. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct MongoUnlockStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoUnlockStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let config = MongoConfig::from_uri(uri, db_name).await?;
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self {
            inner: Arc::new(MongoInner {
                state: RwLock::new(MongoState { client, database }),
            }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        // Locker and country lookups go through `_id`; only the audit log
        // needs a secondary index for the newest-first read path.
        let collection = self.audit_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! { "recorded_at": -1 })
            .options(
                IndexOptions::builder()
                    .name(Some("audit_recorded_at_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: AUDIT_COLLECTION_NAME,
                index: "recorded_at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn locker_collection(&self) -> Collection<MongoLockerDocument> {
        self.database()
            .await
            .collection::<MongoLockerDocument>(LOCKER_COLLECTION_NAME)
    }

    async fn country_collection(&self) -> Collection<MongoCountryDocument> {
        self.database()
            .await
            .collection::<MongoCountryDocument>(COUNTRY_COLLECTION_NAME)
    }

    async fn audit_collection(&self) -> Collection<MongoAuditDocument> {
        self.database()
            .await
            .collection::<MongoAuditDocument>(AUDIT_COLLECTION_NAME)
    }

    async fn ping(&self) -> MongoResult<()> {
        let database = self.database().await;
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn fetch_locker(&self) -> MongoResult<Option<LockerStateEntity>> {
        let collection = self.locker_collection().await;
        let document = collection
            .find_one(doc! { "_id": LOCKER_DOC_ID })
            .await
            .map_err(|source| MongoDaoError::FetchLocker { source })?;
        Ok(document.map(Into::into))
    }

    async fn update_locker(&self, write: LockerWrite) -> MongoResult<Option<LockerStateEntity>> {
        let collection = self.locker_collection().await;
        // The filter carries the previously observed `last_updated`: a row
        // whose timestamp moved in the meantime matches nothing and the
        // caller sees a conflict instead of a silent overwrite.
        let filter = doc! {
            "_id": LOCKER_DOC_ID,
            "last_updated": DateTime::from_system_time(write.expected_last_updated),
        };
        let update = doc! { "$set": {
            "energy_percentage": write.energy_percentage,
            "is_unlocked": write.is_unlocked,
            "last_updated": DateTime::from_system_time(write.last_updated),
        }};

        let document = collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateLocker { source })?;
        Ok(document.map(Into::into))
    }

    async fn fetch_country(&self, code: String) -> MongoResult<Option<CountryStateEntity>> {
        let collection = self.country_collection().await;
        let document = collection
            .find_one(doc! { "_id": &code })
            .await
            .map_err(|source| MongoDaoError::FetchCountry { code, source })?;
        Ok(document.map(Into::into))
    }

    async fn update_country(
        &self,
        code: String,
        write: CountryWrite,
    ) -> MongoResult<Option<CountryStateEntity>> {
        let collection = self.country_collection().await;
        let filter = doc! {
            "_id": &code,
            "last_updated": DateTime::from_system_time(write.expected_last_updated),
        };
        let update = doc! { "$set": {
            "activation_count": write.activation_count,
            "glow_band": write.glow_band,
            "last_updated": DateTime::from_system_time(write.last_updated),
        }};

        let document = collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateCountry { code, source })?;
        Ok(document.map(Into::into))
    }

    async fn list_countries(&self) -> MongoResult<Vec<CountryStateEntity>> {
        let collection = self.country_collection().await;
        let documents: Vec<MongoCountryDocument> = collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|source| MongoDaoError::ListCountries { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCountries { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn append_audit(&self, entry: AuditEntryEntity) -> MongoResult<()> {
        let collection = self.audit_collection().await;
        let document: MongoAuditDocument = entry.into();
        collection
            .insert_one(document)
            .await
            .map_err(|source| MongoDaoError::AppendAudit { source })?;
        Ok(())
    }

    async fn list_audit(&self, limit: i64) -> MongoResult<Vec<AuditEntryEntity>> {
        let collection = self.audit_collection().await;
        let documents: Vec<MongoAuditDocument> = collection
            .find(doc! {})
            .sort(doc! { "recorded_at": -1 })
            .limit(limit)
            .await
            .map_err(|source| MongoDaoError::ListAudit { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListAudit { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn seed(&self, country_codes: Vec<String>) -> MongoResult<()> {
        let now = DateTime::now();

        // `$setOnInsert` upserts keep seeding idempotent: existing rows are
        // never reset, missing ones are created zeroed.
        let lockers = self.locker_collection().await;
        lockers
            .update_one(
                doc! { "_id": LOCKER_DOC_ID },
                doc! { "$setOnInsert": {
                    "energy_percentage": 0,
                    "is_unlocked": false,
                    "last_updated": now,
                }},
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Seed {
                key: LOCKER_DOC_ID.to_owned(),
                source,
            })?;

        let countries = self.country_collection().await;
        for code in country_codes {
            countries
                .update_one(
                    doc! { "_id": &code },
                    doc! { "$setOnInsert": {
                        "activation_count": 0_i64,
                        "glow_band": 0,
                        "last_updated": now,
                    }},
                )
                .upsert(true)
                .await
                .map_err(|source| MongoDaoError::Seed { key: code, source })?;
        }

        Ok(())
    }
}

impl UnlockStore for MongoUnlockStore {
    fn fetch_locker(&self) -> BoxFuture<'static, StorageResult<Option<LockerStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_locker().await.map_err(Into::into) })
    }

    fn update_locker(
        &self,
        write: LockerWrite,
    ) -> BoxFuture<'static, StorageResult<Option<LockerStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_locker(write).await.map_err(Into::into) })
    }

    fn fetch_country(
        &self,
        country_code: String,
    ) -> BoxFuture<'static, StorageResult<Option<CountryStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_country(country_code).await.map_err(Into::into) })
    }

    fn update_country(
        &self,
        country_code: String,
        write: CountryWrite,
    ) -> BoxFuture<'static, StorageResult<Option<CountryStateEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_country(country_code, write)
                .await
                .map_err(Into::into)
        })
    }

    fn list_countries(&self) -> BoxFuture<'static, StorageResult<Vec<CountryStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_countries().await.map_err(Into::into) })
    }

    fn append_audit(&self, entry: AuditEntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_audit(entry).await.map_err(Into::into) })
    }

    fn list_audit(&self, limit: i64) -> BoxFuture<'static, StorageResult<Vec<AuditEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_audit(limit).await.map_err(Into::into) })
    }

    fn seed(&self, country_codes: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.seed(country_codes).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
