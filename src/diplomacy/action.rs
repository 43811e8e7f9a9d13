//! Diplomatic actions and their lifecycle

use serde::{Deserialize, Serialize};

use crate::core::types::{DiplomaticActionId, FactionId, SimTime};

/// A proposed inter-faction maneuver.
///
/// Lifecycle: `Pending` transitions exactly once to `Accepted`, `Rejected`,
/// or `Expired`. Acceptance also executes the action's effects, so an
/// accepted action always has `executed` set. Terminal states are final.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiplomaticAction {
    pub id: DiplomaticActionId,
    pub kind: ActionKind,
    pub source: FactionId,
    pub target: FactionId,
    pub description: String,
    pub terms: Option<String>,
    /// Numeric payload: gift value, mission quality, or tribute amount
    pub value: Option<f64>,
    pub created_at: SimTime,
    pub expires_at: Option<SimTime>,
    pub status: ActionStatus,
    pub executed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    ProposeTreaty,
    BreakTreaty,
    DeclareWar,
    SueForPeace,
    FormAlliance,
    BreakAlliance,
    TradeAgreement,
    DemandTribute,
    GiveGift,
    Insult,
    Praise,
    Threaten,
    DiplomaticMission,
}

impl ActionKind {
    /// Moves the source can take without the target's consent. These are
    /// executed the moment the simulation decides them; consent-based kinds
    /// wait on the target's answer.
    pub fn is_unilateral(self) -> bool {
        matches!(
            self,
            ActionKind::DeclareWar
                | ActionKind::BreakTreaty
                | ActionKind::BreakAlliance
                | ActionKind::GiveGift
                | ActionKind::Insult
                | ActionKind::Praise
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl ActionStatus {
    pub fn is_terminal(self) -> bool {
        self != ActionStatus::Pending
    }
}

impl DiplomaticAction {
    pub fn is_pending(&self) -> bool {
        self.status == ActionStatus::Pending
    }

    /// True if a pending action's expiry time has passed
    pub fn is_stale(&self, now: SimTime) -> bool {
        self.is_pending()
            && self.expires_at.map(|deadline| deadline < now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ActionStatus::Pending.is_terminal());
        assert!(ActionStatus::Accepted.is_terminal());
        assert!(ActionStatus::Rejected.is_terminal());
        assert!(ActionStatus::Expired.is_terminal());
    }

    #[test]
    fn test_staleness_requires_deadline() {
        let mut action = DiplomaticAction {
            id: DiplomaticActionId(1),
            kind: ActionKind::ProposeTreaty,
            source: FactionId(1),
            target: FactionId(2),
            description: String::new(),
            terms: None,
            value: None,
            created_at: SimTime(0),
            expires_at: None,
            status: ActionStatus::Pending,
            executed: false,
        };
        assert!(!action.is_stale(SimTime(1_000_000)));

        action.expires_at = Some(SimTime(500));
        assert!(action.is_stale(SimTime(501)));
        assert!(!action.is_stale(SimTime(500)));

        action.status = ActionStatus::Expired;
        assert!(!action.is_stale(SimTime(501)));
    }
}
