//! Integration tests for territory and resource stores

use dominion::world::resource::{Rarity, ResourceKind, ResourceStore};
use dominion::world::territory::{TerritoryKind, TerritoryStore};

#[test]
fn test_split_resource_scenario() {
    // Quantity 100 at value 5, split off 40: original keeps 60, the new
    // record carries 40 at the same unit value
    let mut store = ResourceStore::new();
    let id = store.create("Iron", ResourceKind::Ore, Rarity::Common, 100.0, 5.0, None);

    let child = store.split(id, 40.0).expect("split should succeed");

    assert_eq!(store.get(id).unwrap().quantity, 60.0);
    let new = store.get(child).unwrap();
    assert_eq!(new.quantity, 40.0);
    assert_eq!(new.value_per_unit, 5.0);
    assert_eq!(new.kind, ResourceKind::Ore);
}

#[test]
fn test_split_combine_round_trip_law() {
    let mut store = ResourceStore::new();
    let id = store.create("Iron", ResourceKind::Ore, Rarity::Uncommon, 100.0, 5.0, None);

    let child = store.split(id, 40.0).unwrap();
    let merged = store.combine(&[id, child]).unwrap();

    let r = store.get(merged).unwrap();
    assert!((r.quantity - 100.0).abs() < 1e-9);
    assert!((r.value_per_unit - 5.0).abs() < 1e-9);
    assert_eq!(r.rarity, Rarity::Uncommon);
}

#[test]
fn test_territory_adjacency_and_resource_binding() {
    let mut territories = TerritoryStore::new();
    let mut resources = ResourceStore::new();

    let pass = territories.create("Pass", TerritoryKind::Fortress, 85.0, 30.0);
    let woods = territories.create("Woods", TerritoryKind::Wilderness, 25.0, 40.0);
    let port = territories.create("Port", TerritoryKind::City, 50.0, 90.0);

    assert!(territories.link_neighbors(pass, woods));
    assert!(territories.link_neighbors(port, woods));

    // Woods sits between both
    let w = territories.get(woods).unwrap();
    assert!(w.neighbors.contains(&pass) && w.neighbors.contains(&port));
    assert!(!territories.get(pass).unwrap().neighbors.contains(&port));

    let vein = resources.create("Iron Vein", ResourceKind::Ore, Rarity::Rare, 500.0, 4.0, Some(pass));
    assert!(territories.attach_resource(pass, vein));
    assert_eq!(territories.get(pass).unwrap().resources, vec![vein]);
    assert_eq!(resources.territory_value(pass), 2000.0);
}

#[test]
fn test_relocation_changes_territory_valuation() {
    let mut territories = TerritoryStore::new();
    let mut resources = ResourceStore::new();

    let a = territories.create("A", TerritoryKind::City, 10.0, 10.0);
    let b = territories.create("B", TerritoryKind::City, 10.0, 10.0);
    let grain = resources.create("Grain", ResourceKind::Food, Rarity::Common, 100.0, 2.0, Some(a));

    assert_eq!(resources.territory_value(a), 200.0);
    assert!(resources.relocate(grain, Some(b)));
    assert_eq!(resources.territory_value(a), 0.0);
    assert_eq!(resources.territory_value(b), 200.0);

    // Unbinding leaves it in no territory at all
    assert!(resources.relocate(grain, None));
    assert_eq!(resources.territory_value(b), 0.0);
}

#[test]
fn test_combine_many_takes_highest_rarity() {
    let mut store = ResourceStore::new();
    let a = store.create("Ore", ResourceKind::Ore, Rarity::Common, 10.0, 1.0, None);
    let b = store.create("Ore", ResourceKind::Ore, Rarity::Legendary, 5.0, 10.0, None);
    let c = store.create("Ore", ResourceKind::Ore, Rarity::Uncommon, 5.0, 2.0, None);

    let merged = store.combine(&[a, b, c]).unwrap();
    let r = store.get(merged).unwrap();

    assert_eq!(r.quantity, 20.0);
    assert_eq!(r.rarity, Rarity::Legendary);
    // (10*1 + 5*10 + 5*2) / 20 = 3.5
    assert!((r.value_per_unit - 3.5).abs() < 1e-9);
    // Only the merged record remains of the inputs
    assert_eq!(store.all().len(), 1);
}
