//! In-process state store mirrored from the backend. Rows are keyed by
//! country code in insertion order so repeated snapshots keep a stable
//! rendering order.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::{CountryStateEntity, LockerStateEntity};
use crate::sync::StateEvent;

/// Transient UI concerns tracked next to the mirrored rows.
#[derive(Debug, Default)]
pub struct UiState {
    /// True while the initial snapshot is in flight.
    pub loading: bool,
    /// Last surfaced error message, if any.
    pub error: Option<String>,
    /// Active toast, if any.
    pub toast: Option<Toast>,
    /// Country code currently under the pointer.
    pub hovered_country: Option<String>,
}

/// A transient notification shown to the operator.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Tag used to dismiss exactly this toast.
    pub id: Uuid,
    /// Message text.
    pub message: String,
}

/// Mirrored backend state plus UI flags.
#[derive(Debug, Default)]
pub struct ClientStore {
    locker: Option<LockerStateEntity>,
    countries: IndexMap<String, CountryStateEntity>,
    ui: UiState,
}

impl ClientStore {
    /// Latest known locker state.
    pub fn locker(&self) -> Option<&LockerStateEntity> {
        self.locker.as_ref()
    }

    /// Latest known row for one country.
    pub fn country(&self, code: &str) -> Option<&CountryStateEntity> {
        self.countries.get(code)
    }

    /// All known country rows in insertion order.
    pub fn countries(&self) -> impl Iterator<Item = &CountryStateEntity> {
        self.countries.values()
    }

    /// UI flags.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Apply the row returned by a mutation the local client itself issued.
    ///
    /// The server response is authoritative, so this replaces without a
    /// timestamp check. Re-applying the same row is a no-op.
    pub fn apply_mutation_result(&mut self, event: StateEvent) {
        match event {
            StateEvent::Locker(locker) => self.locker = Some(locker),
            StateEvent::Country(country) => {
                self.countries.insert(country.country_code.clone(), country);
            }
        }
    }

    /// Replace the whole store from a snapshot, returning whether anything
    /// actually changed. Downstream rendering uses the no-op signal to skip
    /// redraws on idle polls.
    pub fn replace_all(
        &mut self,
        locker: LockerStateEntity,
        countries: Vec<CountryStateEntity>,
    ) -> bool {
        let mut next = IndexMap::with_capacity(countries.len());
        for country in countries {
            next.insert(country.country_code.clone(), country);
        }

        let changed = self.locker.as_ref() != Some(&locker) || self.countries != next;
        if changed {
            self.locker = Some(locker);
            self.countries = next;
        }
        changed
    }

    /// Merge one realtime event, last writer wins by `last_updated`.
    ///
    /// Events may arrive out of order across a reconnect; a row older than
    /// what the store already holds is dropped. Returns whether the store
    /// changed.
    pub fn ingest_realtime_event(&mut self, event: StateEvent) -> bool {
        match event {
            StateEvent::Locker(locker) => {
                if let Some(current) = &self.locker
                    && current.last_updated >= locker.last_updated
                {
                    return false;
                }
                self.locker = Some(locker);
                true
            }
            StateEvent::Country(country) => {
                if let Some(current) = self.countries.get(&country.country_code)
                    && current.last_updated >= country.last_updated
                {
                    return false;
                }
                self.countries.insert(country.country_code.clone(), country);
                true
            }
        }
    }

    /// Set the loading flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.ui.loading = loading;
    }

    /// Record or clear the surfaced error.
    pub fn set_error(&mut self, error: Option<String>) {
        self.ui.error = error;
    }

    /// Show a toast, replacing any active one. Returns its dismissal tag.
    pub fn show_toast(&mut self, message: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.ui.toast = Some(Toast {
            id,
            message: message.into(),
        });
        id
    }

    /// Dismiss the toast with the given tag; stale tags are ignored.
    pub fn dismiss_toast(&mut self, id: Uuid) {
        if self.ui.toast.as_ref().is_some_and(|toast| toast.id == id) {
            self.ui.toast = None;
        }
    }

    /// Track which country the pointer is over.
    pub fn set_hovered_country(&mut self, code: Option<String>) {
        self.ui.hovered_country = code;
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn country(code: &str, count: i64, updated_at: u64) -> CountryStateEntity {
        CountryStateEntity {
            country_code: code.into(),
            activation_count: count,
            glow_band: crate::domain::glow_band_of(count),
            last_updated: at(updated_at),
        }
    }

    fn locker(energy: i32, updated_at: u64) -> LockerStateEntity {
        LockerStateEntity {
            energy_percentage: energy,
            is_unlocked: energy >= 100,
            last_updated: at(updated_at),
        }
    }

    #[test]
    fn mutation_result_replaces_unconditionally() {
        let mut store = ClientStore::default();
        store.apply_mutation_result(StateEvent::Country(country("AU", 5, 10)));
        // The authoritative server response wins even with an older stamp.
        store.apply_mutation_result(StateEvent::Country(country("AU", 3, 5)));
        assert_eq!(store.country("AU").unwrap().activation_count, 3);
    }

    #[test]
    fn mutation_result_is_idempotent() {
        let mut store = ClientStore::default();
        let event = StateEvent::Country(country("AU", 5, 10));
        store.apply_mutation_result(event.clone());
        let first = store.country("AU").cloned();
        store.apply_mutation_result(event);
        assert_eq!(store.country("AU").cloned(), first);
    }

    #[test]
    fn realtime_ingest_drops_stale_rows() {
        let mut store = ClientStore::default();
        assert!(store.ingest_realtime_event(StateEvent::Country(country("AU", 5, 10))));
        assert!(!store.ingest_realtime_event(StateEvent::Country(country("AU", 3, 5))));
        assert_eq!(store.country("AU").unwrap().activation_count, 5);
    }

    #[test]
    fn realtime_ingest_applies_newer_rows() {
        let mut store = ClientStore::default();
        store.ingest_realtime_event(StateEvent::Locker(locker(40, 10)));
        assert!(store.ingest_realtime_event(StateEvent::Locker(locker(50, 11))));
        assert_eq!(store.locker().unwrap().energy_percentage, 50);
    }

    #[test]
    fn replace_all_reports_noop_for_identical_snapshot() {
        let mut store = ClientStore::default();
        let rows = vec![country("AU", 1, 10), country("BR", 2, 10)];

        assert!(store.replace_all(locker(40, 10), rows.clone()));
        assert!(!store.replace_all(locker(40, 10), rows));
    }

    #[test]
    fn replace_all_detects_row_changes() {
        let mut store = ClientStore::default();
        store.replace_all(locker(40, 10), vec![country("AU", 1, 10)]);
        assert!(store.replace_all(locker(40, 10), vec![country("AU", 2, 11)]));
        assert_eq!(store.country("AU").unwrap().activation_count, 2);
    }

    #[test]
    fn toast_dismissal_ignores_stale_tags() {
        let mut store = ClientStore::default();
        let old = store.show_toast("first");
        let _new = store.show_toast("second");
        store.dismiss_toast(old);
        assert!(store.ui().toast.is_some());
    }
}
