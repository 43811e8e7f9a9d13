//! Lightweight diplomatic messages between factions

use serde::{Deserialize, Serialize};

use crate::core::types::{DiplomaticActionId, FactionId, MessageId, SimTime};

/// A message in the diplomatic channel. Lighter weight than an action:
/// no state machine, but may demand a response or reference an action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiplomaticMessage {
    pub id: MessageId,
    pub kind: MessageKind,
    pub sender: FactionId,
    pub recipient: FactionId,
    pub content: String,
    pub requires_response: bool,
    /// The diplomatic action this message refers to, if any
    pub regarding: Option<DiplomaticActionId>,
    pub sent_at: SimTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Greeting,
    Demand,
    Request,
    Warning,
    Threat,
    Apology,
    Praise,
    Insult,
    Offer,
    Refusal,
    Acceptance,
}

impl MessageKind {
    /// Kinds that conventionally expect an answer
    pub fn expects_response(self) -> bool {
        matches!(
            self,
            MessageKind::Demand | MessageKind::Request | MessageKind::Offer
        )
    }
}
