//! World events: external ingestion and random generation

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{EventId, FactionId, SimTime};
use crate::faction::registry::FactionRegistry;
use crate::faction::StateAxis;

/// Something that happened in the world and touched faction state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub affected: Vec<FactionId>,
    pub at: SimTime,
    pub resolved: bool,
}

/// Accepts events and fans them out as state deltas to affected factions
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventFeed {
    events: Vec<WorldEvent>,
    next_id: u64,
}

/// Axes an event may nudge. Kept narrow so events stay background noise
/// rather than a second simulation.
const EVENT_AXES: [StateAxis; 3] = [StateAxis::Power, StateAxis::Wealth, StateAxis::Cohesion];

/// Name/description stock for spontaneous events, paired per category
const RANDOM_EVENTS: [(&str, &str); 6] = [
    ("Border Skirmish", "An armed raid flared along a contested border"),
    ("Market Boom", "A trade route surge brought prosperity to the markets"),
    ("Harvest Failure", "A blighted harvest left granaries near empty"),
    ("Wandering Prophet", "A prophet's preaching stirred the faithful"),
    ("Relic Discovery", "An ancient relic surfaced in the borderlands"),
    ("Bandit Uprising", "Organized banditry choked the roads"),
];

impl EventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Ingest an event: each affected faction takes a small random nudge on
    /// a few state axes and remembers the event for its reaction path. The
    /// event resolves immediately.
    pub fn ingest(
        &mut self,
        registry: &mut FactionRegistry,
        rng: &mut ChaCha8Rng,
        name: &str,
        description: &str,
        affected: &[FactionId],
        at: SimTime,
    ) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;

        let mut touched = Vec::new();
        for &faction_id in affected {
            if let Some(faction) = registry.get_mut(faction_id) {
                for axis in EVENT_AXES {
                    let delta = rng.gen_range(-5.0..=5.0);
                    faction.state.apply(axis, delta);
                }
                faction.witness(at, name, description);
                touched.push(faction_id);
            }
        }

        tracing::debug!("event '{}' touched {} factions", name, touched.len());
        self.events.push(WorldEvent {
            id,
            name: name.to_string(),
            description: description.to_string(),
            affected: touched,
            at,
            resolved: true,
        });
        id
    }

    /// Broadcast an event to every faction: all take the state nudge, and
    /// the registry stamps it onto every faction's reaction slot at once.
    pub fn broadcast(
        &mut self,
        registry: &mut FactionRegistry,
        rng: &mut ChaCha8Rng,
        name: &str,
        description: &str,
        at: SimTime,
    ) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;

        let affected = registry.ids();
        for &faction_id in &affected {
            if let Some(faction) = registry.get_mut(faction_id) {
                for axis in EVENT_AXES {
                    let delta = rng.gen_range(-5.0..=5.0);
                    faction.state.apply(axis, delta);
                }
            }
        }
        registry.record_global_event(at, name, description);

        tracing::debug!("global event '{}' touched every faction", name);
        self.events.push(WorldEvent {
            id,
            name: name.to_string(),
            description: description.to_string(),
            affected,
            at,
            resolved: true,
        });
        id
    }

    /// Generate and immediately resolve one spontaneous event. Every
    /// faction independently has an even chance of being caught up in it.
    pub fn spawn_random(
        &mut self,
        registry: &mut FactionRegistry,
        rng: &mut ChaCha8Rng,
        at: SimTime,
    ) -> EventId {
        let (name, description) = RANDOM_EVENTS[rng.gen_range(0..RANDOM_EVENTS.len())];

        let mut affected = Vec::new();
        for id in registry.ids() {
            if rng.gen_bool(0.5) {
                affected.push(id);
            }
        }

        self.ingest(registry, rng, name, description, &affected, at)
    }
}
