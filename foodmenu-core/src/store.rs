//! Local reflection of the remote food collection.
//!
//! The store is only ever mutated by child events arriving from the remote
//! collection. Presentation order is insertion order; reordering events from
//! the remote side are acknowledged but not applied.

use std::collections::HashMap;

use crate::models::{Food, FoodId};

/// Ordered collection of food items with an id index.
///
/// Every item in `items` has an id, and `index` maps that id to the item's
/// current position. Nothing else is in `index`.
#[derive(Debug, Default)]
pub struct ItemSyncStore {
    items: Vec<Food>,
    index: HashMap<FoodId, usize>,
}

impl ItemSyncStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item unless one with the same id is already present.
    ///
    /// Returns true if the store changed.
    pub fn on_item_added(&mut self, food: Food) -> bool {
        let Some(id) = food.id.clone() else {
            tracing::warn!(name = %food.name, "Ignoring added item without an id");
            return false;
        };

        if self.index.contains_key(&id) {
            tracing::debug!(%id, "Item already present, ignoring add");
            return false;
        }

        self.index.insert(id, self.items.len());
        self.items.push(food);
        true
    }

    /// Replaces the item with the same id in place.
    ///
    /// Changes for ids that are not present are dropped. Returns true if the
    /// store changed.
    pub fn on_item_changed(&mut self, food: Food) -> bool {
        let Some(position) = self.position_of(&food) else {
            tracing::debug!(id = ?food.id, "Change for unknown item, ignoring");
            return false;
        };

        if self.items[position] == food {
            return false;
        }
        self.items[position] = food;
        true
    }

    /// Removes the item with the same id, returning it.
    pub fn on_item_removed(&mut self, food: &Food) -> Option<Food> {
        let position = self.position_of(food)?;
        let removed = self.items.remove(position);
        if let Some(id) = &removed.id {
            self.index.remove(id);
        }
        self.reindex_from(position);
        Some(removed)
    }

    /// Acknowledges a reorder on the remote side. Local order is kept.
    pub fn on_item_moved(&mut self, food: &Food) {
        tracing::debug!(id = ?food.id, name = %food.name, "Item moved remotely, keeping local order");
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Food> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    /// All items in presentation order.
    pub fn get_all(&self) -> &[Food] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position_of(&self, food: &Food) -> Option<usize> {
        food.id
            .as_ref()
            .and_then(|id| self.index.get(id))
            .copied()
    }

    fn reindex_from(&mut self, start: usize) {
        for (position, food) in self.items.iter().enumerate().skip(start) {
            if let Some(id) = &food.id {
                self.index.insert(id.clone(), position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: &str, name: &str, price: &str) -> Food {
        Food::new(name, price).with_id(id)
    }

    fn assert_index_consistent(store: &ItemSyncStore) {
        assert_eq!(store.index.len(), store.items.len());
        for (position, item) in store.items.iter().enumerate() {
            let id = item.id.as_ref().expect("stored item has an id");
            assert_eq!(store.index.get(id), Some(&position));
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = ItemSyncStore::new();
        assert!(store.is_empty());
        assert!(store.get_all().is_empty());
        assert!(store.get_by_id("1").is_none());
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut store = ItemSyncStore::new();
        assert!(store.on_item_added(food("b", "Fries", "2")));
        assert!(store.on_item_added(food("a", "Burger", "5")));

        let names: Vec<&str> = store.get_all().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Fries", "Burger"]);
        assert_index_consistent(&store);
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        let mut store = ItemSyncStore::new();
        assert!(store.on_item_added(food("1", "Burger", "5")));
        assert!(!store.on_item_added(food("1", "Burger", "5")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_does_not_overwrite_existing() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        assert!(!store.on_item_added(food("1", "Burger", "9")));
        assert_eq!(store.get_by_id("1").unwrap().price, "5");
    }

    #[test]
    fn test_add_without_id_is_ignored() {
        let mut store = ItemSyncStore::new();
        assert!(!store.on_item_added(Food::new("Burger", "5")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_change_replaces_in_place() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        store.on_item_added(food("2", "Fries", "2"));

        assert!(store.on_item_changed(food("1", "Burger", "6")));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_all()[0], food("1", "Burger", "6"));
        assert_eq!(store.get_by_id("1").unwrap().price, "6");
        assert_index_consistent(&store);
    }

    #[test]
    fn test_change_with_same_value_reports_no_change() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        assert!(!store.on_item_changed(food("1", "Burger", "5")));
    }

    #[test]
    fn test_change_unknown_id_is_dropped() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        assert!(!store.on_item_changed(food("2", "Fries", "2")));
        assert_eq!(store.len(), 1);
        assert!(!store.contains("2"));
    }

    #[test]
    fn test_latest_change_wins() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        store.on_item_changed(food("1", "Burger", "6"));
        store.on_item_changed(food("1", "Double Burger", "8"));
        assert_eq!(store.get_by_id("1"), Some(&food("1", "Double Burger", "8")));
    }

    #[test]
    fn test_remove_reindexes_later_items() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        store.on_item_added(food("2", "Fries", "2"));
        store.on_item_added(food("3", "Soda", "1"));

        let removed = store.on_item_removed(&food("1", "", ""));
        assert_eq!(removed, Some(food("1", "Burger", "5")));
        assert_eq!(store.get_by_id("3").unwrap().name, "Soda");
        assert!(store.get_by_id("1").is_none());
        assert_index_consistent(&store);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));

        assert!(store.on_item_removed(&food("42", "Ghost", "0")).is_none());
        assert_eq!(store.get_all(), &[food("1", "Burger", "5")]);
    }

    #[test]
    fn test_moved_keeps_order() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        store.on_item_added(food("2", "Fries", "2"));
        let before = store.get_all().to_vec();

        store.on_item_moved(&food("2", "Fries", "2"));
        store.on_item_moved(&food("1", "Burger", "5"));

        assert_eq!(store.get_all(), before.as_slice());
    }

    #[test]
    fn test_burger_scenario() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(food("1", "Burger", "5"));
        store.on_item_added(food("2", "Fries", "2"));
        store.on_item_changed(food("1", "Burger", "6"));
        store.on_item_removed(&food("2", "Fries", "2"));

        assert_eq!(store.get_all(), &[food("1", "Burger", "6")]);
    }

    // Items without an id can never be matched, so a change or removal that
    // arrives without one is dropped rather than applied to some other
    // id-less item.
    #[test]
    fn test_changes_without_id_are_dropped() {
        let mut store = ItemSyncStore::new();
        store.on_item_added(Food::new("Burger", "5"));
        store.on_item_added(food("1", "Fries", "2"));

        assert!(!store.on_item_changed(Food::new("Burger", "6")));
        assert!(store.on_item_removed(&Food::new("Burger", "5")).is_none());
        assert_eq!(store.get_all(), &[food("1", "Fries", "2")]);
    }
}
