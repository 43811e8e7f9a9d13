//! Diplomatic actions, messages, and the engine that resolves them

pub mod action;
pub mod engine;
pub mod message;

pub use action::{ActionKind, ActionStatus, DiplomaticAction};
pub use engine::{acceptance_chance, DiplomacyEngine, Suggestion};
pub use message::{DiplomaticMessage, MessageKind};
