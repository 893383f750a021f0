use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to fetch locker state")]
    FetchLocker {
        #[source]
        source: MongoError,
    },
    #[error("failed to update locker state")]
    UpdateLocker {
        #[source]
        source: MongoError,
    },
    #[error("failed to fetch country `{code}`")]
    FetchCountry {
        code: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to update country `{code}`")]
    UpdateCountry {
        code: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list country states")]
    ListCountries {
        #[source]
        source: MongoError,
    },
    #[error("failed to append audit entry")]
    AppendAudit {
        #[source]
        source: MongoError,
    },
    #[error("failed to list audit entries")]
    ListAudit {
        #[source]
        source: MongoError,
    },
    #[error("failed to seed row `{key}`")]
    Seed {
        key: String,
        #[source]
        source: MongoError,
    },
}
