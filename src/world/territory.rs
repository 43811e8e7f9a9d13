//! Territory - strategic holdings with an undirected adjacency graph

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_state, ResourceId, TerritoryId};

/// A territory a faction can hold and contest
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub kind: TerritoryKind,

    pub strategic_value: f64,
    pub economic_value: f64,
    /// How firmly the current holder controls it, 0-100
    pub control: f64,

    /// Undirected adjacency
    pub neighbors: Vec<TerritoryId>,
    /// Resources bound to this territory
    pub resources: Vec<ResourceId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerritoryKind {
    City,
    Fortress,
    Village,
    Wilderness,
    Dungeon,
    Urban,
    Rural,
}

/// Owns all territory records and their adjacency graph
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TerritoryStore {
    territories: Vec<Territory>,
    #[serde(skip)]
    index: ahash::AHashMap<TerritoryId, usize>,
    next_id: u32,
}

impl TerritoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        name: impl Into<String>,
        kind: TerritoryKind,
        strategic_value: f64,
        economic_value: f64,
    ) -> TerritoryId {
        let id = TerritoryId(self.next_id);
        self.next_id += 1;

        self.index.insert(id, self.territories.len());
        self.territories.push(Territory {
            id,
            name: name.into(),
            kind,
            strategic_value,
            economic_value,
            control: 0.0,
            neighbors: Vec::new(),
            resources: Vec::new(),
        });

        id
    }

    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.index.get(&id).map(|&i| &self.territories[i])
    }

    pub fn get_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        let i = *self.index.get(&id)?;
        Some(&mut self.territories[i])
    }

    /// All territories in creation order
    pub fn all(&self) -> &[Territory] {
        &self.territories
    }

    pub fn by_kind(&self, kind: TerritoryKind) -> impl Iterator<Item = &Territory> {
        self.territories.iter().filter(move |t| t.kind == kind)
    }

    /// Link two territories as neighbors (bidirectional). Returns false if
    /// either id is unknown or the ids are equal.
    pub fn link_neighbors(&mut self, a: TerritoryId, b: TerritoryId) -> bool {
        if a == b || !self.index.contains_key(&a) || !self.index.contains_key(&b) {
            return false;
        }

        if let Some(ta) = self.get_mut(a) {
            if !ta.neighbors.contains(&b) {
                ta.neighbors.push(b);
            }
        }
        if let Some(tb) = self.get_mut(b) {
            if !tb.neighbors.contains(&a) {
                tb.neighbors.push(a);
            }
        }

        true
    }

    /// Attach a resource id to a territory. Returns false for unknown ids.
    pub fn attach_resource(&mut self, territory: TerritoryId, resource: ResourceId) -> bool {
        match self.get_mut(territory) {
            Some(t) => {
                if !t.resources.contains(&resource) {
                    t.resources.push(resource);
                }
                true
            }
            None => false,
        }
    }

    pub fn detach_resource(&mut self, territory: TerritoryId, resource: ResourceId) {
        if let Some(t) = self.get_mut(territory) {
            t.resources.retain(|&r| r != resource);
        }
    }

    pub fn set_control(&mut self, id: TerritoryId, control: f64) -> bool {
        match self.get_mut(id) {
            Some(t) => {
                t.control = clamp_state(control);
                true
            }
            None => false,
        }
    }

    /// Rebuild the id index after deserialization
    pub fn rebuild_index(&mut self) {
        self.index = self
            .territories
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let mut store = TerritoryStore::new();
        let id = store.create("Ironhold", TerritoryKind::Fortress, 80.0, 40.0);
        let t = store.get(id).unwrap();
        assert_eq!(t.name, "Ironhold");
        assert_eq!(t.kind, TerritoryKind::Fortress);
        assert!(store.get(TerritoryId(99)).is_none());
    }

    #[test]
    fn test_link_neighbors_is_bidirectional() {
        let mut store = TerritoryStore::new();
        let a = store.create("A", TerritoryKind::City, 50.0, 60.0);
        let b = store.create("B", TerritoryKind::Village, 20.0, 30.0);

        assert!(store.link_neighbors(a, b));
        assert!(store.get(a).unwrap().neighbors.contains(&b));
        assert!(store.get(b).unwrap().neighbors.contains(&a));

        // Linking again does not duplicate
        assert!(store.link_neighbors(a, b));
        assert_eq!(store.get(a).unwrap().neighbors.len(), 1);
    }

    #[test]
    fn test_link_rejects_self_and_unknown() {
        let mut store = TerritoryStore::new();
        let a = store.create("A", TerritoryKind::City, 50.0, 60.0);
        assert!(!store.link_neighbors(a, a));
        assert!(!store.link_neighbors(a, TerritoryId(42)));
    }

    #[test]
    fn test_control_is_clamped() {
        let mut store = TerritoryStore::new();
        let a = store.create("A", TerritoryKind::City, 50.0, 60.0);
        store.set_control(a, 250.0);
        assert_eq!(store.get(a).unwrap().control, 100.0);
        store.set_control(a, -10.0);
        assert_eq!(store.get(a).unwrap().control, 0.0);
    }

    #[test]
    fn test_rebuild_index_after_load() {
        let mut store = TerritoryStore::new();
        let a = store.create("A", TerritoryKind::City, 50.0, 60.0);
        let json = serde_json::to_string(&store).unwrap();
        let mut loaded: TerritoryStore = serde_json::from_str(&json).unwrap();
        loaded.rebuild_index();
        assert_eq!(loaded.get(a).unwrap().name, "A");
    }
}
