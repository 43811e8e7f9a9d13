//! WorldFacade - the single integration surface for external collaborators
//!
//! NPC, dialogue, and social subsystems talk to the simulation through this
//! object: world setup, per-faction reports, event ingestion, and snapshot
//! save/load. Reads are safe between ticks; the facade serializes access
//! with the engine lock.

use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EventId, FactionId, GoalId, ResourceId, SimTime, TerritoryId};
use crate::diplomacy::engine::DiplomacyEngine;
use crate::faction::faction::{Faction, FactionState, FactionValue, Member};
use crate::faction::goal::{Goal, GoalKind, GoalTarget};
use crate::faction::registry::FactionRegistry;
use crate::faction::relationship::RelationStatus;
use crate::simulation::actions::SimulationAction;
use crate::simulation::engine::SimulationEngine;
use crate::simulation::events::EventFeed;
use crate::simulation::scheduler::TickScheduler;
use crate::simulation::state::WorldState;
use crate::world::resource::{Rarity, ResourceKind, ResourceStore};
use crate::world::territory::{Territory, TerritoryKind, TerritoryStore};
use crate::world::Resource;

/// Serializable snapshot of complete world state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub now: SimTime,
    pub seed: u64,
    /// Seed the loaded world's random source restarts from, derived so a
    /// loaded world stays deterministic
    pub rng_reseed: u64,
    pub ticks: u64,
    pub factions: FactionRegistry,
    pub territories: TerritoryStore,
    pub resources: ResourceStore,
    pub diplomacy: DiplomacyEngine,
    pub events: EventFeed,
}

/// Everything a collaborator needs to know about one faction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactionReport {
    pub faction: Faction,
    pub territories: Vec<Territory>,
    pub resources: Vec<Resource>,
    pub goals: Vec<Goal>,
    pub allies: Vec<FactionId>,
    pub enemies: Vec<FactionId>,
    pub recent_actions: Vec<SimulationAction>,
}

/// How many log records a faction report carries
const REPORT_ACTION_LIMIT: usize = 10;

pub struct WorldFacade {
    engine: Arc<Mutex<SimulationEngine>>,
    scheduler: TickScheduler,
}

impl WorldFacade {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self {
            engine: Arc::new(Mutex::new(SimulationEngine::new(config, seed))),
            scheduler: TickScheduler::new(),
        }
    }

    /// Shared handle to the engine, for callers that need direct access
    pub fn engine(&self) -> Arc<Mutex<SimulationEngine>> {
        Arc::clone(&self.engine)
    }

    // === World setup ===

    pub fn create_faction(
        &self,
        name: &str,
        values: Vec<FactionValue>,
        state: Option<FactionState>,
    ) -> Option<FactionId> {
        let mut engine = self.engine.lock().ok()?;
        Some(engine.world.factions.create(name, values, state))
    }

    pub fn create_territory(
        &self,
        name: &str,
        kind: TerritoryKind,
        strategic_value: f64,
        economic_value: f64,
    ) -> Option<TerritoryId> {
        let mut engine = self.engine.lock().ok()?;
        Some(
            engine
                .world
                .territories
                .create(name, kind, strategic_value, economic_value),
        )
    }

    pub fn link_territories(&self, a: TerritoryId, b: TerritoryId) -> bool {
        match self.engine.lock() {
            Ok(mut engine) => engine.world.territories.link_neighbors(a, b),
            Err(_) => false,
        }
    }

    pub fn create_resource(
        &self,
        name: &str,
        kind: ResourceKind,
        rarity: Rarity,
        quantity: f64,
        value_per_unit: f64,
        territory: Option<TerritoryId>,
    ) -> Option<ResourceId> {
        let mut engine = self.engine.lock().ok()?;
        let world = &mut engine.world;
        let id = world
            .resources
            .create(name, kind, rarity, quantity, value_per_unit, territory);
        if let Some(t) = territory {
            world.territories.attach_resource(t, id);
        }
        Some(id)
    }

    pub fn assign_territory_to_faction(&self, territory: TerritoryId, faction: FactionId) -> bool {
        match self.engine.lock() {
            Ok(mut engine) => engine.world.assign_territory(territory, faction),
            Err(_) => false,
        }
    }

    pub fn set_faction_goal(
        &self,
        faction: FactionId,
        kind: GoalKind,
        title: &str,
        description: &str,
        priority: f64,
        target: Option<GoalTarget>,
    ) -> Option<GoalId> {
        let mut engine = self.engine.lock().ok()?;
        engine
            .world
            .factions
            .add_goal(faction, kind, title, description, priority, target)
    }

    // === Collaborator writes ===

    pub fn register_member(&self, faction: FactionId, member: Member) -> bool {
        match self.engine.lock() {
            Ok(mut engine) => match engine.world.factions.get_mut(faction) {
                Some(f) => {
                    f.add_member(member);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    pub fn remove_member(&self, faction: FactionId, npc_id: &str) -> bool {
        match self.engine.lock() {
            Ok(mut engine) => engine
                .world
                .factions
                .get_mut(faction)
                .map(|f| f.remove_member(npc_id))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Ingest an externally generated event: affected factions take small
    /// random state nudges and the event resolves immediately. An empty
    /// affected list broadcasts to every faction.
    pub fn create_event(
        &self,
        name: &str,
        description: &str,
        affected: &[FactionId],
    ) -> Option<EventId> {
        let mut engine = self.engine.lock().ok()?;
        let world = &mut engine.world;
        let now = world.now;
        if affected.is_empty() {
            Some(world.events.broadcast(
                &mut world.factions,
                &mut world.rng,
                name,
                description,
                now,
            ))
        } else {
            Some(world.events.ingest(
                &mut world.factions,
                &mut world.rng,
                name,
                description,
                affected,
                now,
            ))
        }
    }

    // === Collaborator reads ===

    /// The faction an NPC belongs to, if any
    pub fn membership(&self, npc_id: &str) -> Option<FactionId> {
        let engine = self.engine.lock().ok()?;
        engine
            .world
            .factions
            .all()
            .iter()
            .find(|f| f.member(npc_id).is_some())
            .map(|f| f.id)
    }

    pub fn member_info(&self, faction: FactionId, npc_id: &str) -> Option<Member> {
        let engine = self.engine.lock().ok()?;
        engine.world.factions.get(faction)?.member(npc_id).cloned()
    }

    pub fn attitude_between(&self, a: FactionId, b: FactionId) -> Option<f64> {
        let engine = self.engine.lock().ok()?;
        engine.world.factions.relationship(a, b).map(|r| r.attitude())
    }

    /// Coarse ally/rival/neutral classification of a pair. Pairs with no
    /// recorded relationship read as neutral.
    pub fn classify(&self, a: FactionId, b: FactionId) -> RelationStatus {
        match self.engine.lock() {
            Ok(engine) => engine
                .world
                .factions
                .relationship(a, b)
                .map(|r| r.status)
                .unwrap_or_default(),
            Err(_) => RelationStatus::Neutral,
        }
    }

    pub fn faction_goals(&self, faction: FactionId) -> Vec<Goal> {
        match self.engine.lock() {
            Ok(engine) => engine
                .world
                .factions
                .get(faction)
                .map(|f| f.goals.clone())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Full snapshot: factions, holdings, and the relationship matrix
    pub fn world_state(&self) -> Option<WorldSnapshot> {
        let engine = self.engine.lock().ok()?;
        let world = &engine.world;
        Some(WorldSnapshot {
            now: world.now,
            seed: world.seed,
            // Derived, not drawn, so taking a snapshot perturbs nothing
            rng_reseed: world.seed ^ engine.ticks().wrapping_mul(0x9e37_79b9_7f4a_7c15),
            ticks: engine.ticks(),
            factions: world.factions.clone(),
            territories: world.territories.clone(),
            resources: world.resources.clone(),
            diplomacy: world.diplomacy.clone(),
            events: world.events.clone(),
        })
    }

    pub fn faction_report(&self, faction: FactionId) -> Option<FactionReport> {
        let engine = self.engine.lock().ok()?;
        let world = &engine.world;
        let f = world.factions.get(faction)?.clone();

        let territories = f
            .territories
            .iter()
            .filter_map(|&t| world.territories.get(t).cloned())
            .collect();
        let resources = f
            .resources
            .iter()
            .filter_map(|&r| world.resources.get(r).cloned())
            .collect();

        let mut allies = Vec::new();
        let mut enemies = Vec::new();
        for rel in world.factions.relationships() {
            if !rel.pair.contains(faction) {
                continue;
            }
            let other = rel.pair.other(faction);
            match rel.status {
                RelationStatus::Allied => allies.push(other),
                RelationStatus::Hostile => enemies.push(other),
                RelationStatus::Neutral => {}
            }
        }

        let recent_actions = engine
            .recent_actions(faction, REPORT_ACTION_LIMIT)
            .into_iter()
            .cloned()
            .collect();

        Some(FactionReport {
            goals: f.goals.clone(),
            faction: f,
            territories,
            resources,
            allies,
            enemies,
            recent_actions,
        })
    }

    // === Simulation control ===

    /// Advance the world one tick, synchronously
    pub fn tick(&self) {
        if let Ok(mut engine) = self.engine.lock() {
            engine.tick();
        }
    }

    pub fn start_simulation(&mut self, time_multiplier: f64) -> bool {
        self.scheduler.start(Arc::clone(&self.engine), time_multiplier)
    }

    pub fn stop_simulation(&mut self) -> bool {
        self.scheduler.stop()
    }

    // === Persistence ===

    pub fn serialize_state(&self) -> Result<String> {
        let snapshot = self
            .world_state()
            .ok_or_else(|| crate::core::error::DominionError::Engine("engine lock poisoned".into()))?;
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Best-effort reconstruction from a serialized snapshot. Returns false
    /// on any failure and leaves the current world untouched.
    pub fn deserialize_state(&self, json: &str) -> bool {
        let snapshot: WorldSnapshot = match serde_json::from_str(json) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!("snapshot rejected: {}", err);
                return false;
            }
        };

        let mut factions = snapshot.factions;
        factions.rebuild_index();
        let mut territories = snapshot.territories;
        territories.rebuild_index();
        let mut resources = snapshot.resources;
        resources.rebuild_index();

        let world = WorldState {
            factions,
            territories,
            resources,
            diplomacy: snapshot.diplomacy,
            events: snapshot.events,
            now: snapshot.now,
            rng: ChaCha8Rng::seed_from_u64(snapshot.rng_reseed),
            seed: snapshot.seed,
        };

        match self.engine.lock() {
            Ok(mut engine) => {
                engine.restore(world, snapshot.ticks);
                tracing::info!("world restored at tick {}", snapshot.ticks);
                true
            }
            Err(_) => false,
        }
    }
}
