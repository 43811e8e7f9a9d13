//! Integration tests for the diplomatic state machine

use dominion::core::types::SimTime;
use dominion::diplomacy::action::{ActionKind, ActionStatus};
use dominion::diplomacy::engine::DiplomacyEngine;
use dominion::faction::registry::{FactionRegistry, WAR_DISPUTE};
use dominion::faction::relationship::{RelationStatus, TreatyKind};

fn two_faction_world() -> (
    DiplomacyEngine,
    FactionRegistry,
    dominion::core::types::FactionId,
    dominion::core::types::FactionId,
) {
    let mut registry = FactionRegistry::new();
    let a = registry.create("Raven Compact", vec![], None);
    let b = registry.create("Boar Clans", vec![], None);
    (DiplomacyEngine::new(), registry, a, b)
}

#[test]
fn test_war_to_peace_scenario() {
    let (mut engine, mut registry, a, b) = two_faction_world();

    let war = engine
        .propose(
            &registry,
            a,
            b,
            ActionKind::DeclareWar,
            "The pass dispute boils over",
            None,
            None,
            SimTime(0),
            None,
        )
        .unwrap();
    assert!(engine.accept(&mut registry, war, SimTime(0)));

    {
        let rel = registry.relationship(a, b).unwrap();
        assert_eq!(rel.status, RelationStatus::Hostile);
        assert_eq!(rel.attitude(), -80.0);
        assert!(rel.has_unresolved_dispute(WAR_DISPUTE));
    }

    let peace = engine
        .propose(
            &registry,
            b,
            a,
            ActionKind::SueForPeace,
            "The clans have bled enough",
            Some("white peace".to_string()),
            None,
            SimTime(1),
            None,
        )
        .unwrap();
    assert!(engine.accept(&mut registry, peace, SimTime(1)));

    let rel = registry.relationship(a, b).unwrap();
    assert_eq!(rel.status, RelationStatus::Neutral);
    // Attitude recovered by the full peace bonus from -80
    assert_eq!(rel.attitude(), -50.0);
    assert!(!rel.has_unresolved_dispute(WAR_DISPUTE));
    assert!(rel.has_active_treaty(TreatyKind::Peace));
}

#[test]
fn test_expired_offer_scenario() {
    let (mut engine, mut registry, a, b) = two_faction_world();

    let offer = engine
        .propose(
            &registry,
            a,
            b,
            ActionKind::ProposeTreaty,
            "A pact against the winter raids",
            None,
            None,
            SimTime(0),
            Some(SimTime(1_000)),
        )
        .unwrap();

    assert_eq!(engine.process_pending(&mut registry, SimTime(2_000)), 1);
    assert_eq!(engine.get(offer).unwrap().status, ActionStatus::Expired);
    assert_eq!(registry.relationship(a, b).unwrap().attitude(), -3.0);

    // Expired is terminal: no late acceptance, no extra mutation
    assert!(!engine.accept(&mut registry, offer, SimTime(3_000)));
    assert!(!engine.reject(&mut registry, offer, SimTime(3_000)));
    assert_eq!(registry.relationship(a, b).unwrap().attitude(), -3.0);
}

#[test]
fn test_terminal_states_are_final() {
    let (mut engine, mut registry, a, b) = two_faction_world();

    let accepted = engine
        .propose(&registry, a, b, ActionKind::Praise, "", None, None, SimTime(0), None)
        .unwrap();
    let rejected = engine
        .propose(&registry, a, b, ActionKind::FormAlliance, "", None, None, SimTime(0), None)
        .unwrap();

    assert!(engine.accept(&mut registry, accepted, SimTime(0)));
    assert!(engine.reject(&mut registry, rejected, SimTime(0)));

    for id in [accepted, rejected] {
        assert!(!engine.accept(&mut registry, id, SimTime(1)));
        assert!(!engine.reject(&mut registry, id, SimTime(1)));
    }
    assert_eq!(engine.get(accepted).unwrap().status, ActionStatus::Accepted);
    assert_eq!(engine.get(rejected).unwrap().status, ActionStatus::Rejected);
}

#[test]
fn test_alliance_lifecycle_shapes_status() {
    let (mut engine, mut registry, a, b) = two_faction_world();

    let ally = engine
        .propose(&registry, a, b, ActionKind::FormAlliance, "", None, None, SimTime(0), None)
        .unwrap();
    engine.accept(&mut registry, ally, SimTime(0));
    assert_eq!(registry.relationship(a, b).unwrap().status, RelationStatus::Allied);

    // Gifts and missions stack goodwill while allied
    let gift = engine
        .propose(&registry, a, b, ActionKind::GiveGift, "", None, Some(30.0), SimTime(1), None)
        .unwrap();
    engine.accept(&mut registry, gift, SimTime(1));
    assert_eq!(registry.relationship(a, b).unwrap().attitude(), 35.0);

    let split = engine
        .propose(&registry, b, a, ActionKind::BreakAlliance, "", None, None, SimTime(2), None)
        .unwrap();
    engine.accept(&mut registry, split, SimTime(2));

    let rel = registry.relationship(a, b).unwrap();
    assert_eq!(rel.status, RelationStatus::Neutral);
    assert_eq!(rel.attitude(), 10.0);
    assert!(!rel.has_active_treaty(TreatyKind::Alliance));
}

#[test]
fn test_history_is_append_only_through_transitions() {
    let (mut engine, mut registry, a, b) = two_faction_world();

    let kinds = [
        ActionKind::Praise,
        ActionKind::Insult,
        ActionKind::TradeAgreement,
        ActionKind::Threaten,
    ];
    for (i, kind) in kinds.iter().enumerate() {
        let id = engine
            .propose(&registry, a, b, *kind, "", None, None, SimTime(i as u64), None)
            .unwrap();
        engine.accept(&mut registry, id, SimTime(i as u64));
    }

    let rel = registry.relationship(a, b).unwrap();
    assert_eq!(rel.history.len(), kinds.len());
    // Entries retain chronological order
    for pair in rel.history.windows(2) {
        assert!(pair[0].at <= pair[1].at);
    }
    // +5 - 10 + 10 - 15
    assert_eq!(rel.attitude(), -10.0);
}
