//! Atomically replaceable facility set.

use std::sync::Arc;

use parking_lot::RwLock;

use super::Facility;

/// Holds the known set of facility records.
///
/// Reads hand out a cheap `Arc` snapshot; a refresh builds the new set
/// outside the lock and swaps it in atomically, so readers see either the
/// old set or the new set, never a partial mix. The store has a single
/// writer (the controller, on refresh completion).
pub struct FacilityStore {
    facilities: RwLock<Arc<[Facility]>>,
}

impl FacilityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            facilities: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Creates a store pre-populated with a facility set.
    pub fn with_facilities(facilities: Vec<Facility>) -> Self {
        Self {
            facilities: RwLock::new(Arc::from(facilities)),
        }
    }

    /// Returns a snapshot of the current facility set.
    ///
    /// The snapshot stays valid even if the store is refreshed afterwards.
    pub fn current(&self) -> Arc<[Facility]> {
        self.facilities.read().clone()
    }

    /// Atomically replaces the entire facility set.
    pub fn replace(&self, facilities: Vec<Facility>) {
        *self.facilities.write() = Arc::from(facilities);
    }

    /// Number of facilities currently held.
    pub fn len(&self) -> usize {
        self.facilities.read().len()
    }

    /// True when no facilities are loaded.
    pub fn is_empty(&self) -> bool {
        self.facilities.read().is_empty()
    }
}

impl Default for FacilityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    fn facility(id: u64, lat: f64, lon: f64) -> Facility {
        Facility::new(id, format!("Facility {}", id), Coordinate::new(lat, lon).unwrap())
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = FacilityStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_with_facilities() {
        let store = FacilityStore::with_facilities(vec![facility(1, 10.0, 10.0)]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replace_swaps_whole_set() {
        let store = FacilityStore::with_facilities(vec![facility(1, 10.0, 10.0)]);

        store.replace(vec![facility(2, 20.0, 20.0), facility(3, 30.0, 30.0)]);

        let current = store.current();
        assert_eq!(current.len(), 2);
        assert!(current.iter().all(|f| f.id.0 != 1));
    }

    #[test]
    fn test_old_snapshot_survives_replace() {
        let store = FacilityStore::with_facilities(vec![facility(1, 10.0, 10.0)]);

        let before = store.current();
        store.replace(vec![facility(2, 20.0, 20.0)]);

        // The earlier snapshot is unaffected by the swap
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].id.0, 1);
        assert_eq!(store.current()[0].id.0, 2);
    }

    #[test]
    fn test_replace_with_empty_set() {
        let store = FacilityStore::with_facilities(vec![facility(1, 10.0, 10.0)]);
        store.replace(Vec::new());
        assert!(store.is_empty());
    }
}
