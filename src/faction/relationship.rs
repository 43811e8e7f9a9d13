//! Pairwise faction relationships: attitude, treaties, disputes, history

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_attitude, PairKey, SimTime};

/// The standing between two factions, keyed by their canonical pair
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Relationship {
    pub pair: PairKey,
    /// Signed disposition, always clamped into [-100, 100]
    attitude: f64,
    pub status: RelationStatus,
    pub treaties: Vec<Treaty>,
    pub disputes: Vec<Dispute>,
    /// Append-only record of every attitude change
    pub history: Vec<RelationEntry>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationStatus {
    Allied,
    #[default]
    Neutral,
    Hostile,
}

/// A formal agreement between the pair
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Treaty {
    pub kind: TreatyKind,
    pub terms: String,
    pub active: bool,
    pub signed_at: SimTime,
    pub expires_at: Option<SimTime>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatyKind {
    Peace,
    NonAggression,
    Alliance,
    Trade,
    Tribute,
}

/// An open or settled grievance between the pair
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dispute {
    pub kind: String,
    pub severity: f64,
    pub resolved: bool,
    pub opened_at: SimTime,
}

/// One line of relationship history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationEntry {
    pub at: SimTime,
    pub description: String,
    pub attitude_delta: f64,
}

impl Relationship {
    pub fn new(pair: PairKey) -> Self {
        Self {
            pair,
            attitude: 0.0,
            status: RelationStatus::Neutral,
            treaties: Vec::new(),
            disputes: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn attitude(&self) -> f64 {
        self.attitude
    }

    /// Apply a signed attitude delta, clamping, and append a history entry.
    /// Returns the actual applied delta after clamping.
    pub fn shift_attitude(&mut self, delta: f64, at: SimTime, description: impl Into<String>) -> f64 {
        let before = self.attitude;
        self.attitude = clamp_attitude(self.attitude + delta);
        let applied = self.attitude - before;
        self.history.push(RelationEntry {
            at,
            description: description.into(),
            attitude_delta: applied,
        });
        applied
    }

    /// Force attitude to an exact value, clamping, with a history entry
    pub fn set_attitude(&mut self, value: f64, at: SimTime, description: impl Into<String>) {
        let before = self.attitude;
        self.attitude = clamp_attitude(value);
        self.history.push(RelationEntry {
            at,
            description: description.into(),
            attitude_delta: self.attitude - before,
        });
    }

    pub fn add_treaty(&mut self, kind: TreatyKind, terms: impl Into<String>, at: SimTime) {
        self.treaties.push(Treaty {
            kind,
            terms: terms.into(),
            active: true,
            signed_at: at,
            expires_at: None,
        });
    }

    pub fn has_active_treaty(&self, kind: TreatyKind) -> bool {
        self.treaties.iter().any(|t| t.active && t.kind == kind)
    }

    /// Deactivate every active treaty of the given kind; returns how many
    pub fn deactivate_treaties(&mut self, kind: TreatyKind) -> usize {
        let mut count = 0;
        for treaty in self.treaties.iter_mut().filter(|t| t.active && t.kind == kind) {
            treaty.active = false;
            count += 1;
        }
        count
    }

    pub fn add_dispute(&mut self, kind: impl Into<String>, severity: f64, at: SimTime) {
        self.disputes.push(Dispute {
            kind: kind.into(),
            severity,
            resolved: false,
            opened_at: at,
        });
    }

    /// Mark every unresolved dispute of the given kind resolved; returns how many
    pub fn resolve_disputes(&mut self, kind: &str) -> usize {
        let mut count = 0;
        for dispute in self.disputes.iter_mut().filter(|d| !d.resolved && d.kind == kind) {
            dispute.resolved = true;
            count += 1;
        }
        count
    }

    pub fn has_unresolved_dispute(&self, kind: &str) -> bool {
        self.disputes.iter().any(|d| !d.resolved && d.kind == kind)
    }

    /// Re-derive the coarse status band from attitude. Allied status is only
    /// granted or revoked by diplomacy, so this moves Neutral and Hostile:
    /// below -60 turns hostile; recovering past -20 turns neutral again
    /// unless an unresolved state of war keeps hostility alive.
    pub fn refresh_status(&mut self) {
        match self.status {
            RelationStatus::Allied => {}
            RelationStatus::Neutral => {
                if self.attitude < -60.0 {
                    self.status = RelationStatus::Hostile;
                }
            }
            RelationStatus::Hostile => {
                if self.attitude >= -20.0 && !self.has_unresolved_dispute(super::registry::WAR_DISPUTE)
                {
                    self.status = RelationStatus::Neutral;
                }
            }
        }
    }
}
