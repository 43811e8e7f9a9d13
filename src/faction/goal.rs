//! Faction goals and progress tracking

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_state, FactionId, GoalId, ResourceId, SimTime, TerritoryId};

/// A long-term objective a faction works toward across ticks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub kind: GoalKind,
    pub title: String,
    pub description: String,
    pub priority: f64,
    /// Monotonically non-decreasing, 0-100. A goal at 100 is satisfied but
    /// stays on the list; callers decide whether to prune.
    progress: f64,
    pub target: Option<GoalTarget>,
    pub deadline: Option<SimTime>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalKind {
    Territory,
    Resource,
    Alliance,
    Elimination,
    Influence,
    Wealth,
    Knowledge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalTarget {
    Territory(TerritoryId),
    Faction(FactionId),
    Resource(ResourceId),
}

impl Goal {
    pub fn new(
        id: GoalId,
        kind: GoalKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: f64,
        target: Option<GoalTarget>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            description: description.into(),
            priority,
            progress: 0.0,
            target,
            deadline: None,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Advance progress by a non-negative amount, capped at 100.
    /// Negative amounts are ignored so progress never regresses.
    pub fn advance(&mut self, amount: f64) {
        if amount > 0.0 {
            self.progress = clamp_state(self.progress + amount);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }

    /// True if both goals contest the same territory
    pub fn contests_territory_with(&self, other: &Goal) -> bool {
        matches!(
            (self.kind, other.kind, self.target, other.target),
            (
                GoalKind::Territory,
                GoalKind::Territory,
                Some(GoalTarget::Territory(a)),
                Some(GoalTarget::Territory(b)),
            ) if a == b
        )
    }

    /// True if both goals contest the same resource
    pub fn contests_resource_with(&self, other: &Goal) -> bool {
        matches!(
            (self.kind, other.kind, self.target, other.target),
            (
                GoalKind::Resource,
                GoalKind::Resource,
                Some(GoalTarget::Resource(a)),
                Some(GoalTarget::Resource(b)),
            ) if a == b
        )
    }
}
