//! MongoDB-backed [`UnlockStore`](super::UnlockStore) implementation.

mod connection;
mod error;
mod models;
/// Store implementation and connection lifecycle.
pub mod store;

pub use error::MongoDaoError;
pub use store::MongoUnlockStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
