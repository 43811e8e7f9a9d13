//! Factions, goals, relationships, and the registry that owns them

pub mod faction;
pub mod goal;
pub mod registry;
pub mod relationship;

pub use faction::{Faction, FactionState, FactionValue, Member, MemberRole, StateAxis, ValueKind};
pub use goal::{Goal, GoalKind, GoalTarget};
pub use registry::{FactionRegistry, WAR_DISPUTE};
pub use relationship::{Dispute, RelationStatus, Relationship, Treaty, TreatyKind};
