//! Resource records: creation, splitting, combining, and valuation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{ResourceId, TerritoryId};

/// A stock of a tradeable or consumable resource
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub kind: ResourceKind,
    pub rarity: Rarity,
    /// Quantity never drops below zero
    pub quantity: f64,
    pub value_per_unit: f64,
    /// Territory this stock is bound to, if any
    pub territory: Option<TerritoryId>,
    pub metadata: BTreeMap<String, String>,
}

impl Resource {
    /// Total value of this stock
    pub fn value(&self) -> f64 {
        self.quantity * self.value_per_unit
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Ore,
    Timber,
    Luxury,
    Arcane,
    Currency,
    Knowledge,
}

/// Rarity tiers, ordered from most to least common
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Owns all resource records
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceStore {
    resources: Vec<Resource>,
    #[serde(skip)]
    index: ahash::AHashMap<ResourceId, usize>,
    next_id: u32,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        name: impl Into<String>,
        kind: ResourceKind,
        rarity: Rarity,
        quantity: f64,
        value_per_unit: f64,
        territory: Option<TerritoryId>,
    ) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;

        self.index.insert(id, self.resources.len());
        self.resources.push(Resource {
            id,
            name: name.into(),
            kind,
            rarity,
            quantity: quantity.max(0.0),
            value_per_unit,
            territory,
            metadata: BTreeMap::new(),
        });

        id
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.index.get(&id).map(|&i| &self.resources[i])
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        let i = *self.index.get(&id)?;
        Some(&mut self.resources[i])
    }

    pub fn all(&self) -> &[Resource] {
        &self.resources
    }

    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Resource> {
        self.resources.iter().filter(move |r| r.name == name)
    }

    pub fn by_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn by_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.rarity == rarity)
    }

    pub fn in_territory(&self, territory: TerritoryId) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |r| r.territory == Some(territory))
    }

    /// Adjust quantity by a signed delta, flooring at zero.
    /// Returns the new quantity, or None for an unknown id.
    pub fn adjust_quantity(&mut self, id: ResourceId, delta: f64) -> Option<f64> {
        let resource = self.get_mut(id)?;
        resource.quantity = (resource.quantity + delta).max(0.0);
        Some(resource.quantity)
    }

    /// Move a resource to a different territory, or unbind it
    pub fn relocate(&mut self, id: ResourceId, territory: Option<TerritoryId>) -> bool {
        match self.get_mut(id) {
            Some(r) => {
                r.territory = territory;
                true
            }
            None => false,
        }
    }

    /// Split `amount` off into a new record. The amount must be strictly
    /// between zero and the current quantity; the original is decremented
    /// in place. Returns the new record's id.
    pub fn split(&mut self, id: ResourceId, amount: f64) -> Option<ResourceId> {
        let source = self.get(id)?;
        if amount <= 0.0 || amount >= source.quantity {
            return None;
        }

        let mut child = source.clone();
        let source = self.get_mut(id)?;
        source.quantity -= amount;

        let child_id = ResourceId(self.next_id);
        self.next_id += 1;
        child.id = child_id;
        child.quantity = amount;

        self.index.insert(child_id, self.resources.len());
        self.resources.push(child);

        Some(child_id)
    }

    /// Combine two or more same-kind records into one. Quantities sum,
    /// value-per-unit becomes the quantity-weighted average, rarity becomes
    /// the highest of the inputs, and the originals are deleted. The merged
    /// record takes the first input's name, territory, and metadata.
    pub fn combine(&mut self, ids: &[ResourceId]) -> Option<ResourceId> {
        if ids.len() < 2 {
            return None;
        }

        let mut inputs = Vec::with_capacity(ids.len());
        for &id in ids {
            inputs.push(self.get(id)?.clone());
        }

        let kind = inputs[0].kind;
        if inputs.iter().any(|r| r.kind != kind) {
            return None;
        }

        let total_quantity: f64 = inputs.iter().map(|r| r.quantity).sum();
        let value_per_unit = if total_quantity > 0.0 {
            inputs
                .iter()
                .map(|r| r.quantity * r.value_per_unit)
                .sum::<f64>()
                / total_quantity
        } else {
            inputs[0].value_per_unit
        };
        let rarity = inputs.iter().map(|r| r.rarity).max().unwrap_or(Rarity::Common);

        for &id in ids {
            self.remove(id);
        }

        let merged = ResourceId(self.next_id);
        self.next_id += 1;
        self.index.insert(merged, self.resources.len());
        self.resources.push(Resource {
            id: merged,
            name: inputs[0].name.clone(),
            kind,
            rarity,
            quantity: total_quantity,
            value_per_unit,
            territory: inputs[0].territory,
            metadata: inputs[0].metadata.clone(),
        });

        Some(merged)
    }

    /// Total value of a single resource
    pub fn value_of(&self, id: ResourceId) -> Option<f64> {
        self.get(id).map(|r| r.value())
    }

    /// Summed value of every resource bound to a territory
    pub fn territory_value(&self, territory: TerritoryId) -> f64 {
        self.in_territory(territory).map(|r| r.value()).sum()
    }

    fn remove(&mut self, id: ResourceId) {
        if let Some(i) = self.index.remove(&id) {
            self.resources.remove(i);
            // Positions after the removed element shift down
            for (pos, r) in self.resources.iter().enumerate().skip(i) {
                self.index.insert(r.id, pos);
            }
        }
    }

    /// Rebuild the id index after deserialization
    pub fn rebuild_index(&mut self) {
        self.index = self
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(quantity: f64, value_per_unit: f64) -> (ResourceStore, ResourceId) {
        let mut store = ResourceStore::new();
        let id = store.create(
            "Iron",
            ResourceKind::Ore,
            Rarity::Common,
            quantity,
            value_per_unit,
            None,
        );
        (store, id)
    }

    #[test]
    fn test_split_partitions_quantity() {
        let (mut store, id) = store_with(100.0, 5.0);
        let child = store.split(id, 40.0).unwrap();

        assert_eq!(store.get(id).unwrap().quantity, 60.0);
        assert_eq!(store.get(child).unwrap().quantity, 40.0);
        assert_eq!(store.get(child).unwrap().value_per_unit, 5.0);
    }

    #[test]
    fn test_split_rejects_bad_amounts() {
        let (mut store, id) = store_with(100.0, 5.0);
        assert!(store.split(id, 0.0).is_none());
        assert!(store.split(id, 100.0).is_none());
        assert!(store.split(id, 150.0).is_none());
        assert!(store.split(ResourceId(99), 10.0).is_none());
    }

    #[test]
    fn test_combine_weighted_average_and_rarity() {
        let mut store = ResourceStore::new();
        let a = store.create("Iron", ResourceKind::Ore, Rarity::Common, 60.0, 4.0, None);
        let b = store.create("Iron", ResourceKind::Ore, Rarity::Rare, 40.0, 10.0, None);

        let merged = store.combine(&[a, b]).unwrap();
        let r = store.get(merged).unwrap();

        assert_eq!(r.quantity, 100.0);
        // (60*4 + 40*10) / 100 = 6.4
        assert!((r.value_per_unit - 6.4).abs() < 1e-9);
        assert_eq!(r.rarity, Rarity::Rare);
        assert!(store.get(a).is_none());
        assert!(store.get(b).is_none());
    }

    #[test]
    fn test_combine_rejects_mixed_kinds() {
        let mut store = ResourceStore::new();
        let a = store.create("Iron", ResourceKind::Ore, Rarity::Common, 60.0, 4.0, None);
        let b = store.create("Wheat", ResourceKind::Food, Rarity::Common, 40.0, 1.0, None);
        assert!(store.combine(&[a, b]).is_none());
        assert!(store.combine(&[a]).is_none());
    }

    #[test]
    fn test_split_then_combine_round_trip() {
        let (mut store, id) = store_with(100.0, 5.0);
        let child = store.split(id, 37.0).unwrap();
        let merged = store.combine(&[id, child]).unwrap();

        let r = store.get(merged).unwrap();
        assert!((r.quantity - 100.0).abs() < 1e-9);
        assert!((r.value_per_unit - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_quantity_floors_at_zero() {
        let (mut store, id) = store_with(10.0, 5.0);
        assert_eq!(store.adjust_quantity(id, -25.0), Some(0.0));
        assert_eq!(store.adjust_quantity(id, 3.0), Some(3.0));
        assert!(store.adjust_quantity(ResourceId(99), 1.0).is_none());
    }

    #[test]
    fn test_territory_value_sums() {
        let mut store = ResourceStore::new();
        let t = TerritoryId(0);
        store.create("Iron", ResourceKind::Ore, Rarity::Common, 10.0, 5.0, Some(t));
        store.create("Wheat", ResourceKind::Food, Rarity::Common, 100.0, 0.5, Some(t));
        store.create("Silk", ResourceKind::Luxury, Rarity::Rare, 5.0, 20.0, None);

        assert!((store.territory_value(t) - 100.0).abs() < 1e-9);
    }
}
