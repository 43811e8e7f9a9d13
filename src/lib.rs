//! Dominion - autonomous faction simulation engine

pub mod core;
pub mod diplomacy;
pub mod facade;
pub mod faction;
pub mod simulation;
pub mod world;

pub use facade::{FactionReport, WorldFacade, WorldSnapshot};
