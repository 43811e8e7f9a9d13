//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for territories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

/// Unique identifier for resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Unique identifier for faction goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoalId(pub u32);

/// Unique identifier for diplomatic actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiplomaticActionId(pub u64);

/// Unique identifier for diplomatic messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Unique identifier for simulation log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimActionId(pub u64);

/// Unique identifier for world events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// Simulated time in milliseconds since world creation
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(pub u64);

impl SimTime {
    pub fn advance(&mut self, interval_ms: u64) {
        self.0 += interval_ms;
    }

    /// Age of `earlier` relative to this time, saturating at zero
    pub fn since(&self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Canonical unordered pair of faction ids.
///
/// Always stores the lower id first so relationship lookups are symmetric
/// regardless of argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey(pub FactionId, pub FactionId);

impl PairKey {
    pub fn new(a: FactionId, b: FactionId) -> Self {
        if a.0 <= b.0 {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, id: FactionId) -> bool {
        self.0 == id || self.1 == id
    }

    /// The member of the pair that is not `id`
    pub fn other(&self, id: FactionId) -> FactionId {
        if self.0 == id {
            self.1
        } else {
            self.0
        }
    }
}

/// Clamp a scalar into [0, 100]
pub fn clamp_state(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Clamp a signed scalar into [-100, 100]
pub fn clamp_attitude(value: f64) -> f64 {
    value.clamp(-100.0, 100.0)
}
