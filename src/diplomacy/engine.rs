//! Diplomacy engine: proposes actions, resolves them against the
//! relationship table, and sweeps expired offers

use serde::{Deserialize, Serialize};

use crate::core::types::{DiplomaticActionId, FactionId, MessageId, SimTime};
use crate::diplomacy::action::{ActionKind, ActionStatus, DiplomaticAction};
use crate::diplomacy::message::{DiplomaticMessage, MessageKind};
use crate::faction::registry::{FactionRegistry, WAR_DISPUTE};
use crate::faction::relationship::{RelationStatus, TreatyKind};
use crate::faction::StateAxis;

/// Attitude penalty for letting an offer lapse unanswered
const EXPIRY_PENALTY: f64 = -3.0;

/// Owns every diplomatic action and message ever created
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiplomacyEngine {
    actions: Vec<DiplomaticAction>,
    messages: Vec<DiplomaticMessage>,
    next_action_id: u64,
    next_message_id: u64,
}

/// A recommended next move toward a particular faction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub target: FactionId,
    pub kind: ActionKind,
}

impl DiplomacyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending action. Returns None when either faction is unknown
    /// or source and target are the same.
    #[allow(clippy::too_many_arguments)]
    pub fn propose(
        &mut self,
        registry: &FactionRegistry,
        source: FactionId,
        target: FactionId,
        kind: ActionKind,
        description: impl Into<String>,
        terms: Option<String>,
        value: Option<f64>,
        now: SimTime,
        expires_at: Option<SimTime>,
    ) -> Option<DiplomaticActionId> {
        if source == target || registry.get(source).is_none() || registry.get(target).is_none() {
            return None;
        }

        let id = DiplomaticActionId(self.next_action_id);
        self.next_action_id += 1;

        self.actions.push(DiplomaticAction {
            id,
            kind,
            source,
            target,
            description: description.into(),
            terms,
            value,
            created_at: now,
            expires_at,
            status: ActionStatus::Pending,
            executed: false,
        });

        Some(id)
    }

    pub fn get(&self, id: DiplomaticActionId) -> Option<&DiplomaticAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn actions(&self) -> &[DiplomaticAction] {
        &self.actions
    }

    /// Pending actions addressed to a faction, oldest first
    pub fn pending_for(&self, target: FactionId) -> impl Iterator<Item = &DiplomaticAction> {
        self.actions
            .iter()
            .filter(move |a| a.is_pending() && a.target == target)
    }

    /// Pending actions between a pair, in either direction, oldest first
    pub fn pending_between(
        &self,
        a: FactionId,
        b: FactionId,
    ) -> impl Iterator<Item = &DiplomaticAction> {
        self.actions.iter().filter(move |action| {
            action.is_pending()
                && ((action.source == a && action.target == b)
                    || (action.source == b && action.target == a))
        })
    }

    /// Accept a pending action and execute its effects against the
    /// relationship table. Returns false (and mutates nothing) when the
    /// action is unknown or already in a terminal state.
    pub fn accept(
        &mut self,
        registry: &mut FactionRegistry,
        id: DiplomaticActionId,
        now: SimTime,
    ) -> bool {
        let action = match self.actions.iter_mut().find(|a| a.id == id) {
            Some(a) if a.is_pending() => a,
            _ => return false,
        };
        action.status = ActionStatus::Accepted;
        action.executed = true;

        let action = action.clone();
        execute_accepted(registry, &action, now);
        tracing::debug!(
            "diplomacy: {:?} from {:?} to {:?} accepted",
            action.kind,
            action.source,
            action.target
        );
        true
    }

    /// Reject a pending action, applying a penalty scaled by how serious
    /// the overture was. Returns false when the action is unknown or
    /// already terminal.
    pub fn reject(
        &mut self,
        registry: &mut FactionRegistry,
        id: DiplomaticActionId,
        now: SimTime,
    ) -> bool {
        let action = match self.actions.iter_mut().find(|a| a.id == id) {
            Some(a) if a.is_pending() => a,
            _ => return false,
        };
        action.status = ActionStatus::Rejected;

        let (kind, source, target) = (action.kind, action.source, action.target);
        let penalty = rejection_penalty(kind);
        registry.update_attitude(
            source,
            target,
            penalty,
            now,
            format!("{:?} rebuffed", kind),
        );
        true
    }

    /// Sweep pending actions whose expiry has passed: each transitions to
    /// Expired and costs the pair a small attitude penalty for the ignored
    /// offer. Returns how many expired.
    pub fn process_pending(&mut self, registry: &mut FactionRegistry, now: SimTime) -> usize {
        let mut expired = Vec::new();
        for action in &mut self.actions {
            if action.is_stale(now) {
                action.status = ActionStatus::Expired;
                expired.push((action.source, action.target, action.kind));
            }
        }

        for (source, target, kind) in &expired {
            registry.update_attitude(
                *source,
                *target,
                EXPIRY_PENALTY,
                now,
                format!("{:?} left unanswered", kind),
            );
        }
        expired.len()
    }

    /// Record a message in the diplomatic channel
    pub fn send_message(
        &mut self,
        sender: FactionId,
        recipient: FactionId,
        kind: MessageKind,
        content: impl Into<String>,
        regarding: Option<DiplomaticActionId>,
        now: SimTime,
    ) -> MessageId {
        let id = MessageId(self.next_message_id);
        self.next_message_id += 1;

        self.messages.push(DiplomaticMessage {
            id,
            kind,
            sender,
            recipient,
            content: content.into(),
            requires_response: kind.expects_response(),
            regarding,
            sent_at: now,
        });
        id
    }

    pub fn messages_for(&self, recipient: FactionId) -> impl Iterator<Item = &DiplomaticMessage> {
        self.messages.iter().filter(move |m| m.recipient == recipient)
    }

    /// Recommend plausible next moves for a faction toward every other
    /// faction, banded on current attitude. Advisory only; the simulation's
    /// diplomatic focus picks from these.
    pub fn suggestions(registry: &FactionRegistry, faction: FactionId) -> Vec<Suggestion> {
        let mut out = Vec::new();

        for other in registry.all() {
            if other.id == faction {
                continue;
            }
            let (attitude, status) = registry
                .relationship(faction, other.id)
                .map(|r| (r.attitude(), r.status))
                .unwrap_or((0.0, RelationStatus::Neutral));

            let kinds: &[ActionKind] = if attitude < -60.0 {
                &[ActionKind::DeclareWar, ActionKind::Threaten]
            } else if attitude < -20.0 {
                &[ActionKind::Threaten, ActionKind::Insult]
            } else if attitude < 20.0 {
                &[ActionKind::DiplomaticMission, ActionKind::TradeAgreement]
            } else if attitude < 60.0 {
                &[ActionKind::FormAlliance, ActionKind::ProposeTreaty]
            } else {
                &[ActionKind::GiveGift, ActionKind::Praise]
            };

            for &kind in kinds {
                out.push(Suggestion {
                    target: other.id,
                    kind,
                });
            }
            if status == RelationStatus::Hostile {
                out.push(Suggestion {
                    target: other.id,
                    kind: ActionKind::SueForPeace,
                });
            }
        }

        out
    }
}

/// How likely the target is to accept a pending action, given its attitude
/// toward the source. Unilateral moves need no consent.
pub fn acceptance_chance(kind: ActionKind, attitude: f64) -> f64 {
    if kind.is_unilateral() {
        return 1.0;
    }
    let goodwill = (attitude + 100.0) / 200.0;
    match kind {
        ActionKind::FormAlliance => (goodwill - 0.35).clamp(0.0, 0.9),
        ActionKind::SueForPeace => (goodwill + 0.3).clamp(0.0, 0.95),
        // Coercion works worse the more the target despises the source
        ActionKind::DemandTribute | ActionKind::Threaten => {
            (goodwill * 0.5).clamp(0.05, 0.5)
        }
        _ => goodwill.clamp(0.05, 0.9),
    }
}

/// Attitude penalty the proposer takes when the target turns an offer down
fn rejection_penalty(kind: ActionKind) -> f64 {
    match kind {
        ActionKind::ProposeTreaty | ActionKind::TradeAgreement => -5.0,
        ActionKind::FormAlliance => -10.0,
        ActionKind::SueForPeace => -15.0,
        ActionKind::DemandTribute => -2.0,
        ActionKind::Threaten => -20.0,
        _ => -3.0,
    }
}

/// Apply the type-specific effects of an accepted action
fn execute_accepted(registry: &mut FactionRegistry, action: &DiplomaticAction, now: SimTime) {
    let (source, target) = (action.source, action.target);
    let terms = action.terms.clone().unwrap_or_default();

    let rel = match registry.relationship_mut(source, target) {
        Some(rel) => rel,
        None => return,
    };

    match action.kind {
        ActionKind::ProposeTreaty => {
            rel.add_treaty(TreatyKind::NonAggression, terms, now);
            rel.shift_attitude(10.0, now, "Pact signed");
            rel.refresh_status();
        }
        ActionKind::BreakTreaty => {
            // Walks away from the most recent active agreement
            if let Some(treaty) = rel.treaties.iter_mut().rev().find(|t| t.active) {
                treaty.active = false;
            }
            rel.shift_attitude(-10.0, now, "Treaty broken");
            rel.add_dispute("broken treaty", 4.0, now);
            rel.refresh_status();
        }
        ActionKind::DeclareWar => {
            rel.set_attitude(-80.0, now, "War declared");
            rel.status = RelationStatus::Hostile;
            rel.add_dispute(WAR_DISPUTE, 10.0, now);
            rel.deactivate_treaties(TreatyKind::Peace);
            rel.deactivate_treaties(TreatyKind::NonAggression);
        }
        ActionKind::SueForPeace => {
            rel.add_treaty(TreatyKind::Peace, terms, now);
            // Goodwill recovers by up to 30, but a pair coming out of deep
            // hostility can climb no higher than -30 in one stroke, and
            // peace never lowers standing that is already above the cap.
            let current = rel.attitude();
            let raised = current + 30.0;
            let capped = if current < 0.0 { raised.min(-30.0) } else { raised };
            rel.set_attitude(capped.max(current), now, "Peace concluded");
            rel.status = RelationStatus::Neutral;
            rel.resolve_disputes(WAR_DISPUTE);
        }
        ActionKind::FormAlliance => {
            rel.add_treaty(TreatyKind::Alliance, terms, now);
            rel.shift_attitude(20.0, now, "Alliance formed");
            rel.status = RelationStatus::Allied;
        }
        ActionKind::BreakAlliance => {
            rel.deactivate_treaties(TreatyKind::Alliance);
            rel.shift_attitude(-25.0, now, "Alliance broken");
            rel.status = RelationStatus::Neutral;
            rel.add_dispute("broken alliance", 6.0, now);
            rel.refresh_status();
        }
        ActionKind::TradeAgreement => {
            rel.add_treaty(TreatyKind::Trade, terms, now);
            rel.shift_attitude(10.0, now, "Trade agreement signed");
            rel.refresh_status();
        }
        ActionKind::DemandTribute => {
            let amount = action.value.unwrap_or(10.0);
            rel.add_treaty(TreatyKind::Tribute, terms, now);
            rel.shift_attitude(-8.0, now, "Tribute extracted");
            rel.refresh_status();
            // The payment itself: wealth flows from target to source
            let payment = (amount / 2.0).min(15.0);
            if let Some(f) = registry.get_mut(target) {
                f.state.apply(StateAxis::Wealth, -payment);
            }
            if let Some(f) = registry.get_mut(source) {
                f.state.apply(StateAxis::Wealth, payment);
            }
        }
        ActionKind::GiveGift => {
            let value = action.value.unwrap_or(10.0);
            rel.shift_attitude((value / 2.0).min(15.0), now, "Gift received");
            rel.refresh_status();
        }
        ActionKind::Insult => {
            rel.shift_attitude(-10.0, now, "Public insult");
            rel.refresh_status();
        }
        ActionKind::Praise => {
            rel.shift_attitude(5.0, now, "Public praise");
            rel.refresh_status();
        }
        ActionKind::Threaten => {
            rel.shift_attitude(-15.0, now, "Threat delivered");
            rel.refresh_status();
        }
        ActionKind::DiplomaticMission => {
            let quality = action.value.unwrap_or(5.0);
            let mut boost = quality + 5.0;
            if rel.attitude() > 0.0 {
                boost *= 1.5;
            }
            rel.shift_attitude(boost, now, "Diplomatic mission received");
            rel.refresh_status();
        }
    }
}
