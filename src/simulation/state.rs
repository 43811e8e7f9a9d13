//! WorldState - the explicit aggregate every subsystem operates on

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{FactionId, ResourceId, SimTime, TerritoryId};
use crate::diplomacy::engine::DiplomacyEngine;
use crate::faction::registry::FactionRegistry;
use crate::simulation::events::EventFeed;
use crate::world::{ResourceStore, TerritoryStore};

/// All mutable world state, owned in one place and passed by reference.
/// No ambient singletons: parallel test worlds are just two values.
pub struct WorldState {
    pub factions: FactionRegistry,
    pub territories: TerritoryStore,
    pub resources: ResourceStore,
    pub diplomacy: DiplomacyEngine,
    pub events: EventFeed,
    pub now: SimTime,
    /// Deterministic source for every probability gate and shuffle
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl WorldState {
    pub fn new(seed: u64) -> Self {
        Self {
            factions: FactionRegistry::new(),
            territories: TerritoryStore::new(),
            resources: ResourceStore::new(),
            diplomacy: DiplomacyEngine::new(),
            events: EventFeed::new(),
            now: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The faction currently holding a territory, if any
    pub fn territory_owner(&self, territory: TerritoryId) -> Option<FactionId> {
        self.factions
            .all()
            .iter()
            .find(|f| f.territories.contains(&territory))
            .map(|f| f.id)
    }

    /// Territories no faction holds, in creation order
    pub fn unclaimed_territories(&self) -> Vec<TerritoryId> {
        self.territories
            .all()
            .iter()
            .map(|t| t.id)
            .filter(|&id| self.territory_owner(id).is_none())
            .collect()
    }

    /// Summed value of every resource a faction holds directly
    pub fn faction_resource_value(&self, faction: FactionId) -> f64 {
        self.factions
            .get(faction)
            .map(|f| {
                f.resources
                    .iter()
                    .filter_map(|&id| self.resources.value_of(id))
                    .sum()
            })
            .unwrap_or(0.0)
    }

    /// Move a resource to a different territory or unbind it, keeping the
    /// territory-side binding lists in step. Returns false when the
    /// resource or destination is unknown.
    pub fn relocate_resource(&mut self, resource: ResourceId, to: Option<TerritoryId>) -> bool {
        let from = match self.resources.get(resource) {
            Some(r) => r.territory,
            None => return false,
        };
        if let Some(t) = to {
            if self.territories.get(t).is_none() {
                return false;
            }
        }

        self.resources.relocate(resource, to);
        if let Some(t) = from {
            self.territories.detach_resource(t, resource);
        }
        if let Some(t) = to {
            self.territories.attach_resource(t, resource);
        }
        true
    }

    /// Hand a territory to a faction, removing it from any previous holder.
    /// Returns false when either id is unknown.
    pub fn assign_territory(&mut self, territory: TerritoryId, faction: FactionId) -> bool {
        if self.territories.get(territory).is_none() || self.factions.get(faction).is_none() {
            return false;
        }
        for f in self.factions.all_mut() {
            f.territories.remove(&territory);
        }
        if let Some(f) = self.factions.get_mut(faction) {
            f.territories.insert(territory);
        }
        true
    }
}
