//! Client-side mirror of the backend state: an in-process store fed by the
//! realtime stream, with a polling fallback when the stream is down. Embedded
//! by display frontends that consume this crate as a library.

pub mod feed;
pub mod store;

use thiserror::Error;

use crate::dao::models::{CountryStateEntity, LockerStateEntity};

/// One row-level change, as carried by the realtime stream.
#[derive(Debug, Clone)]
pub enum StateEvent {
    /// The locker singleton changed.
    Locker(LockerStateEntity),
    /// One country row changed.
    Country(CountryStateEntity),
}

/// Full state as returned by a snapshot fetch.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The locker singleton.
    pub locker: LockerStateEntity,
    /// Every country row.
    pub countries: Vec<CountryStateEntity>,
}

/// Error surface for snapshot fetches.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The snapshot source could not be reached.
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
}
