// ── Building selector ──
//
// Client-side filter over the already-loaded building list; no network.
// Selecting narrows the visible set to exactly one building.

use std::sync::Arc;
use std::sync::Mutex;

use crate::error::CoreError;
use crate::model::Building;
use crate::store::EntityStore;

/// Narrows the visible building set by case-insensitive substring match
/// on name. Orthogonal to server-side device search.
pub struct BuildingSelector {
    store: Arc<EntityStore>,
    selected: Mutex<Option<u64>>,
}

impl BuildingSelector {
    pub(crate) fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            selected: Mutex::new(None),
        }
    }

    /// Filter buildings by case-insensitive substring on name.
    /// An empty query yields the unfiltered full set.
    pub fn filter(&self, query: &str) -> Vec<Arc<Building>> {
        let snapshot = self.store.buildings_snapshot();
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            return snapshot.iter().cloned().collect();
        }

        snapshot
            .iter()
            .filter(|b| b.name.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    /// Select a building, narrowing subsequent device loads to it.
    pub fn select(&self, building_id: u64) -> Result<Arc<Building>, CoreError> {
        let building = self
            .store
            .building(building_id)
            .ok_or(CoreError::BuildingNotFound { building_id })?;
        *self.lock() = Some(building_id);
        Ok(building)
    }

    /// Clear the selection, restoring the full visible set.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn selected(&self) -> Option<u64> {
        *self.lock()
    }

    /// The currently visible buildings: the selected one, or all.
    pub fn visible(&self) -> Vec<Arc<Building>> {
        match self.selected() {
            Some(id) => self.store.building(id).into_iter().collect(),
            None => self.store.buildings_snapshot().iter().cloned().collect(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<u64>> {
        // Selection is plain data; a poisoned lock would mean a panic
        // mid-assignment, which cannot corrupt an Option<u64>.
        match self.selected.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Schedule;
    use chrono::NaiveTime;

    fn store_with(names: &[(u64, &str)]) -> Arc<EntityStore> {
        let store = Arc::new(EntityStore::new());
        let buildings = names
            .iter()
            .map(|(id, name)| Building {
                id: *id,
                name: (*name).to_owned(),
                schedule: Schedule::Daily {
                    time: NaiveTime::MIN,
                },
            })
            .collect();
        store.replace_buildings(buildings);
        store
    }

    #[test]
    fn empty_query_yields_full_set() {
        let selector = BuildingSelector::new(store_with(&[(1, "North"), (2, "South")]));
        assert_eq!(selector.filter("").len(), 2);
        assert_eq!(selector.filter("   ").len(), 2);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let selector =
            BuildingSelector::new(store_with(&[(1, "North Annex"), (2, "South Depot")]));

        let hits = selector.filter("aNNex");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        assert!(selector.filter("warehouse").is_empty());
    }

    #[test]
    fn select_narrows_visible_set_to_one() {
        let selector = BuildingSelector::new(store_with(&[(1, "North"), (2, "South")]));
        assert_eq!(selector.visible().len(), 2);

        selector.select(2).expect("building exists");
        let visible = selector.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);

        selector.clear();
        assert_eq!(selector.visible().len(), 2);
    }

    #[test]
    fn select_unknown_building_fails() {
        let selector = BuildingSelector::new(store_with(&[(1, "North")]));
        assert!(matches!(
            selector.select(9),
            Err(CoreError::BuildingNotFound { building_id: 9 })
        ));
    }
}
