//! Territory and resource stores

pub mod resource;
pub mod territory;

pub use resource::{Rarity, Resource, ResourceKind, ResourceStore};
pub use territory::{Territory, TerritoryKind, TerritoryStore};
