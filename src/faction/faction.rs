//! Faction - autonomous organization with values, state, goals, and holdings

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_attitude, clamp_state, FactionId, ResourceId, SimTime, TerritoryId};
use crate::faction::goal::Goal;

/// An autonomous political/economic organization
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,

    /// Declared ideology: value types with signed strength
    pub values: Vec<FactionValue>,
    pub state: FactionState,
    pub goals: Vec<Goal>,

    /// Holdings. Ordered sets keep tick iteration deterministic.
    pub territories: BTreeSet<TerritoryId>,
    pub resources: BTreeSet<ResourceId>,

    /// External NPC members with their role in the faction
    pub members: Vec<Member>,

    /// Most recent event this faction witnessed, for the reaction path
    pub last_event: Option<WitnessedEvent>,
}

/// One axis of a faction's ideology, strength in [-100, 100]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionValue {
    pub kind: ValueKind,
    pub strength: f64,
}

impl FactionValue {
    pub fn new(kind: ValueKind, strength: f64) -> Self {
        Self {
            kind,
            strength: clamp_attitude(strength),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Tradition,
    Honor,
    Wealth,
    Power,
    Knowledge,
    Freedom,
    Order,
    Faith,
}

/// The eight bounded scalars describing a faction's condition.
/// Every write clamps into [0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionState {
    pub power: f64,
    pub wealth: f64,
    pub cohesion: f64,
    pub reputation: f64,
    pub influence: f64,
    pub isolation: f64,
    pub aggression: f64,
    pub corruption: f64,
}

impl Default for FactionState {
    fn default() -> Self {
        Self {
            power: 50.0,
            wealth: 50.0,
            cohesion: 50.0,
            reputation: 50.0,
            influence: 50.0,
            isolation: 20.0,
            aggression: 30.0,
            corruption: 20.0,
        }
    }
}

/// Named axes of `FactionState`, used in effect payloads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateAxis {
    Power,
    Wealth,
    Cohesion,
    Reputation,
    Influence,
    Isolation,
    Aggression,
    Corruption,
}

impl FactionState {
    pub fn get(&self, axis: StateAxis) -> f64 {
        match axis {
            StateAxis::Power => self.power,
            StateAxis::Wealth => self.wealth,
            StateAxis::Cohesion => self.cohesion,
            StateAxis::Reputation => self.reputation,
            StateAxis::Influence => self.influence,
            StateAxis::Isolation => self.isolation,
            StateAxis::Aggression => self.aggression,
            StateAxis::Corruption => self.corruption,
        }
    }

    /// Apply a signed delta to one axis, clamping into [0, 100]
    pub fn apply(&mut self, axis: StateAxis, delta: f64) {
        let slot = match axis {
            StateAxis::Power => &mut self.power,
            StateAxis::Wealth => &mut self.wealth,
            StateAxis::Cohesion => &mut self.cohesion,
            StateAxis::Reputation => &mut self.reputation,
            StateAxis::Influence => &mut self.influence,
            StateAxis::Isolation => &mut self.isolation,
            StateAxis::Aggression => &mut self.aggression,
            StateAxis::Corruption => &mut self.corruption,
        };
        *slot = clamp_state(*slot + delta);
    }

    /// Clamp every axis into range. Used when callers hand in raw state.
    pub fn normalized(mut self) -> Self {
        self.power = clamp_state(self.power);
        self.wealth = clamp_state(self.wealth);
        self.cohesion = clamp_state(self.cohesion);
        self.reputation = clamp_state(self.reputation);
        self.influence = clamp_state(self.influence);
        self.isolation = clamp_state(self.isolation);
        self.aggression = clamp_state(self.aggression);
        self.corruption = clamp_state(self.corruption);
        self
    }
}

/// An NPC registered as a member of a faction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    /// Identifier owned by the external NPC system
    pub npc_id: String,
    pub role: MemberRole,
    pub influence: f64,
    pub loyalty: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    Leader,
    Officer,
    Agent,
    Rank,
}

/// An event a faction has witnessed and may still react to
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WitnessedEvent {
    pub at: SimTime,
    pub name: String,
    pub description: String,
}

impl Faction {
    pub fn new(id: FactionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            values: Vec::new(),
            state: FactionState::default(),
            goals: Vec::new(),
            territories: BTreeSet::new(),
            resources: BTreeSet::new(),
            members: Vec::new(),
            last_event: None,
        }
    }

    pub fn member(&self, npc_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.npc_id == npc_id)
    }

    pub fn add_member(&mut self, member: Member) {
        if self.member(&member.npc_id).is_none() {
            self.members.push(member);
        }
    }

    pub fn remove_member(&mut self, npc_id: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.npc_id != npc_id);
        self.members.len() != before
    }

    /// Highest-priority goal that has not yet completed
    pub fn active_goal_mut(&mut self) -> Option<&mut Goal> {
        self.goals
            .iter_mut()
            .filter(|g| !g.is_complete())
            .max_by(|a, b| a.priority.total_cmp(&b.priority))
    }

    pub fn witness(&mut self, at: SimTime, name: impl Into<String>, description: impl Into<String>) {
        self.last_event = Some(WitnessedEvent {
            at,
            name: name.into(),
            description: description.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::goal::{GoalKind, GoalTarget};

    #[test]
    fn test_state_apply_clamps() {
        let mut state = FactionState::default();
        state.apply(StateAxis::Power, 75.0);
        assert_eq!(state.power, 100.0);
        state.apply(StateAxis::Wealth, -200.0);
        assert_eq!(state.wealth, 0.0);
    }

    #[test]
    fn test_normalized_bounds_every_axis() {
        let state = FactionState {
            power: 300.0,
            wealth: -5.0,
            ..FactionState::default()
        }
        .normalized();
        assert_eq!(state.power, 100.0);
        assert_eq!(state.wealth, 0.0);
    }

    #[test]
    fn test_member_add_remove() {
        let mut faction = Faction::new(FactionId(1), "Ravens");
        faction.add_member(Member {
            npc_id: "npc-1".into(),
            role: MemberRole::Leader,
            influence: 80.0,
            loyalty: 90.0,
        });
        // Duplicate registration is ignored
        faction.add_member(Member {
            npc_id: "npc-1".into(),
            role: MemberRole::Rank,
            influence: 1.0,
            loyalty: 1.0,
        });
        assert_eq!(faction.members.len(), 1);
        assert!(faction.remove_member("npc-1"));
        assert!(!faction.remove_member("npc-1"));
    }

    #[test]
    fn test_active_goal_picks_highest_priority() {
        let mut faction = Faction::new(FactionId(1), "Ravens");
        faction.goals.push(Goal::new(
            crate::core::types::GoalId(1),
            GoalKind::Wealth,
            "Fill the vaults",
            "",
            3.0,
            None,
        ));
        faction.goals.push(Goal::new(
            crate::core::types::GoalId(2),
            GoalKind::Territory,
            "Take the pass",
            "",
            8.0,
            Some(GoalTarget::Territory(crate::core::types::TerritoryId(0))),
        ));

        assert_eq!(faction.active_goal_mut().unwrap().title, "Take the pass");
    }
}
