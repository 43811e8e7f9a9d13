//! Per-focus-area action execution and the simulation audit log

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{FactionId, ResourceId, SimActionId, SimTime, TerritoryId};
use crate::diplomacy::action::ActionKind;
use crate::diplomacy::engine::{acceptance_chance, DiplomacyEngine};
use crate::faction::goal::{GoalKind, GoalTarget};
use crate::faction::StateAxis;
use crate::simulation::state::WorldState;

/// Immutable audit record of one executed faction action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationAction {
    pub id: SimActionId,
    pub faction: FactionId,
    pub kind: SimActionKind,
    pub description: String,
    pub at: SimTime,
    pub effects: ActionEffects,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimActionKind {
    PursueGoal,
    ExpandTerritory,
    ImproveEconomy,
    StrengthenMilitary,
    DiplomaticAction,
    InternalDevelopment,
    ReactToEvent,
}

/// Structured effects payload attached to each log record.
///
/// State and relationship deltas are applied by the engine after the
/// executor returns; territory/resource lists and notes are descriptive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionEffects {
    pub state_deltas: Vec<(StateAxis, f64)>,
    pub relationship_deltas: Vec<(FactionId, f64, String)>,
    pub territories: Vec<TerritoryId>,
    pub resources: Vec<ResourceId>,
    pub notes: Vec<String>,
}

/// What an executor produced; the engine stamps id and timestamp
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub kind: SimActionKind,
    pub description: String,
    pub effects: ActionEffects,
}

/// Dispatch one focus area to its executor. Returns None when the action
/// does not apply to the faction's current situation.
pub fn execute(
    world: &mut WorldState,
    config: &SimulationConfig,
    faction: FactionId,
    focus: SimActionKind,
) -> Option<ActionOutcome> {
    match focus {
        SimActionKind::PursueGoal => pursue_goal(world, faction),
        SimActionKind::ExpandTerritory => expand_territory(world, config, faction),
        SimActionKind::ImproveEconomy => improve_economy(world, faction),
        SimActionKind::StrengthenMilitary => strengthen_military(world, config, faction),
        SimActionKind::DiplomaticAction => diplomatic_action(world, config, faction),
        SimActionKind::InternalDevelopment => internal_development(world, config, faction),
        SimActionKind::ReactToEvent => react_to_event(world, config, faction),
    }
}

/// Advance the highest-priority open goal by 10-20 points, at a small
/// upkeep cost. Completion may propagate a follow-on goal.
fn pursue_goal(world: &mut WorldState, faction_id: FactionId) -> Option<ActionOutcome> {
    let state = world.factions.get(faction_id)?.state;
    let roll: f64 = world.rng.gen_range(0.0..3.0);

    let faction = world.factions.get_mut(faction_id)?;
    let goal = faction.active_goal_mut()?;

    // Progress scales with how well-positioned the faction is for this
    // kind of objective
    let signal = match goal.kind {
        GoalKind::Territory | GoalKind::Elimination => state.power,
        GoalKind::Resource | GoalKind::Wealth => state.wealth,
        GoalKind::Alliance | GoalKind::Influence => state.influence,
        GoalKind::Knowledge => state.cohesion,
    };
    let advance = (10.0 + signal / 20.0 + roll).min(20.0);

    goal.advance(advance);
    let title = goal.title.clone();
    let kind = goal.kind;
    let target = goal.target;
    let priority = goal.priority;
    let completed = goal.is_complete();

    let mut effects = ActionEffects {
        state_deltas: vec![(StateAxis::Wealth, -1.0)],
        ..Default::default()
    };

    let description = if completed {
        effects.notes.push(format!("goal achieved: {}", title));

        // A taken objective that still is not held turns into a campaign
        // of influence over it
        if kind == GoalKind::Territory {
            if let Some(GoalTarget::Territory(t)) = target {
                if world.territory_owner(t) != Some(faction_id) {
                    world.factions.add_goal(
                        faction_id,
                        GoalKind::Influence,
                        format!("Sway {}", title),
                        "Press the claim through influence",
                        priority * 0.5,
                        Some(GoalTarget::Territory(t)),
                    );
                    effects.notes.push("claim pressed through influence".into());
                }
            }
        }
        format!("Achieved goal: {}", title)
    } else {
        format!("Advanced goal: {}", title)
    };

    Some(ActionOutcome {
        kind: SimActionKind::PursueGoal,
        description,
        effects,
    })
}

/// Try to take the most valuable reachable unclaimed territory. Success
/// rides on power scaled by world volatility; failure costs standing.
fn expand_territory(
    world: &mut WorldState,
    config: &SimulationConfig,
    faction_id: FactionId,
) -> Option<ActionOutcome> {
    let faction = world.factions.get(faction_id)?;
    let power = faction.state.power;

    // Reachable candidates: unclaimed neighbors of held land, or anywhere
    // unclaimed for a landless faction
    let mut candidates: Vec<TerritoryId> = if faction.territories.is_empty() {
        world.unclaimed_territories()
    } else {
        let mut out = Vec::new();
        for &held in &faction.territories {
            if let Some(territory) = world.territories.get(held) {
                for &neighbor in &territory.neighbors {
                    if world.territory_owner(neighbor).is_none() && !out.contains(&neighbor) {
                        out.push(neighbor);
                    }
                }
            }
        }
        out
    };
    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| {
        let sa = world.territories.get(*a).map(|t| t.strategic_value).unwrap_or(0.0);
        let sb = world.territories.get(*b).map(|t| t.strategic_value).unwrap_or(0.0);
        sb.total_cmp(&sa).then(a.0.cmp(&b.0))
    });
    let target = candidates[0];
    let name = world
        .territories
        .get(target)
        .map(|t| t.name.clone())
        .unwrap_or_default();

    let succeeded = world.rng.gen::<f64>() < (power / 100.0) * config.volatility;
    if succeeded {
        world.assign_territory(target, faction_id);
        world.territories.set_control(target, 50.0);
        Some(ActionOutcome {
            kind: SimActionKind::ExpandTerritory,
            description: format!("Claimed territory {}", name),
            effects: ActionEffects {
                state_deltas: vec![(StateAxis::Influence, 2.0)],
                territories: vec![target],
                ..Default::default()
            },
        })
    } else {
        Some(ActionOutcome {
            kind: SimActionKind::ExpandTerritory,
            description: format!("Failed expansion into {}", name),
            effects: ActionEffects {
                state_deltas: vec![
                    (StateAxis::Power, -2.0),
                    (StateAxis::Wealth, -3.0),
                    (StateAxis::Reputation, -2.0),
                ],
                notes: vec!["expansion repulsed".into()],
                ..Default::default()
            },
        })
    }
}

/// Economic program: succeeds more often in cohesive, uncorrupt factions
fn improve_economy(world: &mut WorldState, faction_id: FactionId) -> Option<ActionOutcome> {
    let state = world.factions.get(faction_id)?.state;
    let chance = 0.7 + state.cohesion / 200.0 - state.corruption / 200.0;

    if world.rng.gen::<f64>() < chance {
        Some(ActionOutcome {
            kind: SimActionKind::ImproveEconomy,
            description: "Economic reforms took hold".into(),
            effects: ActionEffects {
                state_deltas: vec![(StateAxis::Wealth, 8.0), (StateAxis::Influence, 1.0)],
                ..Default::default()
            },
        })
    } else {
        Some(ActionOutcome {
            kind: SimActionKind::ImproveEconomy,
            description: "Economic reforms stalled".into(),
            effects: ActionEffects {
                notes: vec!["reform program stalled".into()],
                ..Default::default()
            },
        })
    }
}

/// Military buildup, skipped when the treasury cannot cover it
fn strengthen_military(
    world: &mut WorldState,
    config: &SimulationConfig,
    faction_id: FactionId,
) -> Option<ActionOutcome> {
    let state = world.factions.get(faction_id)?.state;
    if state.wealth < config.military_cost {
        return None;
    }

    Some(ActionOutcome {
        kind: SimActionKind::StrengthenMilitary,
        description: "Raised and drilled new forces".into(),
        effects: ActionEffects {
            state_deltas: vec![
                (StateAxis::Power, 7.0),
                (StateAxis::Aggression, 3.0),
                (StateAxis::Wealth, -config.military_cost),
            ],
            ..Default::default()
        },
    })
}

/// Pick a suggested diplomatic move and run it through the diplomacy
/// engine. Unilateral moves execute outright; consent-based offers are
/// answered immediately by the target's acceptance heuristic.
fn diplomatic_action(
    world: &mut WorldState,
    config: &SimulationConfig,
    faction_id: FactionId,
) -> Option<ActionOutcome> {
    let suggestions = DiplomacyEngine::suggestions(&world.factions, faction_id);
    if suggestions.is_empty() {
        return None;
    }
    let pick = *suggestions.choose(&mut world.rng)?;

    let value = match pick.kind {
        ActionKind::GiveGift => Some(world.rng.gen_range(5.0..30.0)),
        ActionKind::DiplomaticMission => Some(world.rng.gen_range(1.0..10.0)),
        ActionKind::DemandTribute => Some(world.rng.gen_range(5.0..20.0)),
        _ => None,
    };
    let expires_at = SimTime(world.now.0 + 2 * config.tick_interval_ms);

    let source_name = world.factions.get(faction_id)?.name.clone();
    let action_id = world.diplomacy.propose(
        &world.factions,
        faction_id,
        pick.target,
        pick.kind,
        format!("{} pursues {:?}", source_name, pick.kind),
        None,
        value,
        world.now,
        Some(expires_at),
    )?;

    let attitude = world
        .factions
        .relationship(pick.target, faction_id)
        .map(|r| r.attitude())
        .unwrap_or(0.0);
    let chance = acceptance_chance(pick.kind, attitude);
    let accepted = world.rng.gen::<f64>() < chance;

    let outcome = if accepted {
        world
            .diplomacy
            .accept(&mut world.factions, action_id, world.now);
        "carried"
    } else {
        world
            .diplomacy
            .reject(&mut world.factions, action_id, world.now);
        "rebuffed"
    };

    Some(ActionOutcome {
        kind: SimActionKind::DiplomaticAction,
        description: format!("{:?} toward {:?} {}", pick.kind, pick.target, outcome),
        effects: ActionEffects {
            notes: vec![format!("diplomatic overture {}", outcome)],
            ..Default::default()
        },
    })
}

/// Address the worse of the two internal rots: corruption or fraying
/// cohesion
fn internal_development(
    world: &mut WorldState,
    config: &SimulationConfig,
    faction_id: FactionId,
) -> Option<ActionOutcome> {
    let state = world.factions.get(faction_id)?.state;

    let corruption_excess = state.corruption - config.high_corruption_threshold;
    let cohesion_deficit = config.low_cohesion_threshold - state.cohesion;

    if corruption_excess >= cohesion_deficit {
        Some(ActionOutcome {
            kind: SimActionKind::InternalDevelopment,
            description: "Purged corrupt officials".into(),
            effects: ActionEffects {
                state_deltas: vec![(StateAxis::Corruption, -6.0), (StateAxis::Cohesion, 2.0)],
                ..Default::default()
            },
        })
    } else {
        Some(ActionOutcome {
            kind: SimActionKind::InternalDevelopment,
            description: "Strengthened internal bonds".into(),
            effects: ActionEffects {
                state_deltas: vec![(StateAxis::Cohesion, 6.0), (StateAxis::Corruption, -1.0)],
                ..Default::default()
            },
        })
    }
}

/// Respond to the most recently witnessed event with a small state nudge
/// keyed on its wording. Stale events (older than the freshness window)
/// are ignored.
fn react_to_event(
    world: &mut WorldState,
    config: &SimulationConfig,
    faction_id: FactionId,
) -> Option<ActionOutcome> {
    let window = config.event_freshness_ticks * config.tick_interval_ms;
    let faction = world.factions.get_mut(faction_id)?;
    let event = faction.last_event.take()?;
    if world.now.since(event.at) > window {
        return None;
    }

    let text = format!("{} {}", event.name, event.description).to_lowercase();
    let (deltas, response) = if ["war", "attack", "raid", "skirmish", "bandit"]
        .iter()
        .any(|k| text.contains(k))
    {
        (
            vec![(StateAxis::Aggression, 3.0), (StateAxis::Power, 1.0)],
            "mobilized against the threat",
        )
    } else if ["trade", "market", "boom", "prosper", "harvest"]
        .iter()
        .any(|k| text.contains(k))
    {
        (
            vec![(StateAxis::Wealth, 2.0), (StateAxis::Influence, 1.0)],
            "moved to profit from it",
        )
    } else if ["plague", "famine", "disaster", "blight", "failure"]
        .iter()
        .any(|k| text.contains(k))
    {
        (
            vec![(StateAxis::Cohesion, 2.0), (StateAxis::Wealth, -2.0)],
            "organized relief",
        )
    } else if ["relic", "discovery", "prophet", "knowledge"]
        .iter()
        .any(|k| text.contains(k))
    {
        (
            vec![(StateAxis::Influence, 2.0)],
            "claimed a stake in the news",
        )
    } else {
        (vec![(StateAxis::Cohesion, 1.0)], "took stock of events")
    };

    Some(ActionOutcome {
        kind: SimActionKind::ReactToEvent,
        description: format!("Reacting to '{}': {}", event.name, response),
        effects: ActionEffects {
            state_deltas: deltas,
            notes: vec![format!("response to {}", event.name)],
            ..Default::default()
        },
    })
}
