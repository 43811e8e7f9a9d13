//! Faction registry and the pairwise relationship table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, GoalId, PairKey, SimTime};
use crate::faction::faction::{Faction, FactionState, FactionValue};
use crate::faction::goal::{Goal, GoalKind, GoalTarget};
use crate::faction::relationship::Relationship;

/// Dispute kind opened by a declaration of war and resolved by peace
pub const WAR_DISPUTE: &str = "state of war";

/// Owns every faction and the relationship record for each unordered pair
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FactionRegistry {
    factions: Vec<Faction>,
    /// Ordered map keeps the drift pass deterministic. Serialized as a
    /// sequence since the pair key is structural.
    #[serde(
        serialize_with = "serialize_relationships",
        deserialize_with = "deserialize_relationships"
    )]
    relationships: BTreeMap<PairKey, Relationship>,
    #[serde(skip)]
    index: ahash::AHashMap<FactionId, usize>,
    next_faction_id: u32,
    next_goal_id: u32,
}

impl FactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        name: impl Into<String>,
        values: Vec<FactionValue>,
        state: Option<FactionState>,
    ) -> FactionId {
        let id = FactionId(self.next_faction_id);
        self.next_faction_id += 1;

        let mut faction = Faction::new(id, name);
        faction.values = values;
        if let Some(state) = state {
            faction.state = state.normalized();
        }

        self.index.insert(id, self.factions.len());
        self.factions.push(faction);
        id
    }

    pub fn get(&self, id: FactionId) -> Option<&Faction> {
        self.index.get(&id).map(|&i| &self.factions[i])
    }

    pub fn get_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        let i = *self.index.get(&id)?;
        Some(&mut self.factions[i])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Faction> {
        self.factions.iter().find(|f| f.name == name)
    }

    /// All factions in creation order
    pub fn all(&self) -> &[Faction] {
        &self.factions
    }

    pub fn all_mut(&mut self) -> &mut [Faction] {
        &mut self.factions
    }

    pub fn ids(&self) -> Vec<FactionId> {
        self.factions.iter().map(|f| f.id).collect()
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Add a goal to a faction, assigning its id. Returns None for an
    /// unknown faction.
    pub fn add_goal(
        &mut self,
        faction: FactionId,
        kind: GoalKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: f64,
        target: Option<GoalTarget>,
    ) -> Option<GoalId> {
        if !self.index.contains_key(&faction) {
            return None;
        }
        let id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;

        let goal = Goal::new(id, kind, title, description, priority, target);
        self.get_mut(faction)?.goals.push(goal);
        Some(id)
    }

    /// The relationship record for an unordered pair, creating a neutral one
    /// on first access. Returns None when either faction is unknown or the
    /// ids are equal.
    pub fn relationship_mut(&mut self, a: FactionId, b: FactionId) -> Option<&mut Relationship> {
        if a == b || !self.index.contains_key(&a) || !self.index.contains_key(&b) {
            return None;
        }
        let key = PairKey::new(a, b);
        Some(
            self.relationships
                .entry(key)
                .or_insert_with(|| Relationship::new(key)),
        )
    }

    pub fn relationship(&self, a: FactionId, b: FactionId) -> Option<&Relationship> {
        self.relationships.get(&PairKey::new(a, b))
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// Shift the pair's attitude with a history entry and refresh the
    /// coarse status band. Returns false when the pair does not resolve.
    pub fn update_attitude(
        &mut self,
        a: FactionId,
        b: FactionId,
        delta: f64,
        at: SimTime,
        description: impl Into<String>,
    ) -> bool {
        match self.relationship_mut(a, b) {
            Some(rel) => {
                rel.shift_attitude(delta, at, description);
                rel.refresh_status();
                true
            }
            None => false,
        }
    }

    /// Stamp a world event onto every faction's reaction slot
    pub fn record_global_event(&mut self, at: SimTime, name: &str, description: &str) {
        for faction in &mut self.factions {
            faction.witness(at, name, description);
        }
    }

    /// One natural relationship-drift pass over every faction pair.
    ///
    /// Ideological affinity pulls attitude up, competing territory and
    /// resource claims push it down, with no action required from either
    /// party. Factions withdrawn past the isolation cutoff sit the pass out.
    /// Returns the number of pairs adjusted.
    pub fn drift_relationships(&mut self, at: SimTime, isolation_cutoff: f64) -> usize {
        let mut adjusted = 0;

        let ids = self.ids();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a, b) = (ids[i], ids[j]);
                let (fa, fb) = match (self.get(a), self.get(b)) {
                    (Some(fa), Some(fb)) => (fa, fb),
                    _ => continue,
                };
                if fa.state.isolation > isolation_cutoff || fb.state.isolation > isolation_cutoff {
                    continue;
                }

                let compatibility = value_compatibility(fa, fb);
                let conflict = goal_conflict(fa, fb);
                let adjustment = (compatibility - conflict) / 10.0;

                if adjustment != 0.0 {
                    let description = format!(
                        "Natural drift: shared values {:.0}, competing claims {:.0}",
                        compatibility, conflict
                    );
                    self.update_attitude(a, b, adjustment, at, description);
                    adjusted += 1;
                }
            }
        }

        adjusted
    }

    /// Rebuild the id index after deserialization
    pub fn rebuild_index(&mut self) {
        self.index = self
            .factions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();
    }
}

fn serialize_relationships<S>(
    map: &BTreeMap<PairKey, Relationship>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(map.values())
}

fn deserialize_relationships<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<PairKey, Relationship>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let records = Vec::<Relationship>::deserialize(deserializer)?;
    Ok(records.into_iter().map(|r| (r.pair, r)).collect())
}

/// How ideologically compatible two factions are, 0-100.
///
/// Counts value types both declare: matching sign is shared ground,
/// opposite sign is friction. 50 is the indifferent baseline, also used
/// when either faction declares no values at all.
fn value_compatibility(a: &Faction, b: &Faction) -> f64 {
    if a.values.is_empty() || b.values.is_empty() {
        return 50.0;
    }

    let mut shared = 0i32;
    let mut opposing = 0i32;
    for va in &a.values {
        for vb in &b.values {
            if va.kind != vb.kind {
                continue;
            }
            let product = va.strength * vb.strength;
            if product > 0.0 {
                shared += 1;
            } else if product < 0.0 {
                opposing += 1;
            }
        }
    }

    let denom = a.values.len().max(b.values.len()) as f64;
    (50.0 + 50.0 * f64::from(shared - opposing) / denom).clamp(0.0, 100.0)
}

/// How sharply two factions' goals collide, 0-100.
///
/// 20 points per territory both target, 10 per resource both target.
fn goal_conflict(a: &Faction, b: &Faction) -> f64 {
    let mut conflict: f64 = 0.0;
    for ga in &a.goals {
        for gb in &b.goals {
            if ga.contests_territory_with(gb) {
                conflict += 20.0;
            } else if ga.contests_resource_with(gb) {
                conflict += 10.0;
            }
        }
    }
    conflict.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TerritoryId;
    use crate::faction::faction::ValueKind;

    fn registry_with_two() -> (FactionRegistry, FactionId, FactionId) {
        let mut registry = FactionRegistry::new();
        let a = registry.create("Ravens", vec![], None);
        let b = registry.create("Boars", vec![], None);
        (registry, a, b)
    }

    #[test]
    fn test_relationship_is_symmetric() {
        let (mut registry, a, b) = registry_with_two();
        registry.update_attitude(a, b, 12.0, SimTime(0), "gift");

        let ab = registry.relationship(a, b).unwrap().attitude();
        let ba = registry.relationship(b, a).unwrap().attitude();
        assert_eq!(ab, ba);
        assert_eq!(ab, 12.0);
    }

    #[test]
    fn test_relationship_rejects_self_pair() {
        let (mut registry, a, _) = registry_with_two();
        assert!(registry.relationship_mut(a, a).is_none());
        assert!(!registry.update_attitude(a, a, 5.0, SimTime(0), "mirror"));
    }

    #[test]
    fn test_lookup_by_name() {
        let (registry, a, _) = registry_with_two();
        assert_eq!(registry.get_by_name("Ravens").unwrap().id, a);
        assert!(registry.get_by_name("Wolves").is_none());
    }

    #[test]
    fn test_value_compatibility_matching_signs() {
        let mut registry = FactionRegistry::new();
        let a = registry.create(
            "Ravens",
            vec![
                FactionValue::new(ValueKind::Honor, 80.0),
                FactionValue::new(ValueKind::Order, 60.0),
            ],
            None,
        );
        let b = registry.create(
            "Boars",
            vec![
                FactionValue::new(ValueKind::Honor, 50.0),
                FactionValue::new(ValueKind::Order, -40.0),
            ],
            None,
        );

        let fa = registry.get(a).unwrap();
        let fb = registry.get(b).unwrap();
        // One shared, one opposing over max(2, 2) values: exactly baseline
        assert_eq!(value_compatibility(fa, fb), 50.0);
    }

    #[test]
    fn test_value_compatibility_defaults_without_values() {
        let (registry, a, b) = registry_with_two();
        assert_eq!(
            value_compatibility(registry.get(a).unwrap(), registry.get(b).unwrap()),
            50.0
        );
    }

    #[test]
    fn test_goal_conflict_caps_at_100() {
        let (mut registry, a, b) = registry_with_two();
        for i in 0..6 {
            let t = TerritoryId(i);
            registry.add_goal(a, GoalKind::Territory, "t", "", 5.0, Some(GoalTarget::Territory(t)));
            registry.add_goal(b, GoalKind::Territory, "t", "", 5.0, Some(GoalTarget::Territory(t)));
        }
        let conflict = goal_conflict(registry.get(a).unwrap(), registry.get(b).unwrap());
        assert_eq!(conflict, 100.0);
    }

    #[test]
    fn test_drift_skips_isolated_factions() {
        let (mut registry, a, b) = registry_with_two();
        registry.get_mut(a).unwrap().state.isolation = 90.0;
        let adjusted = registry.drift_relationships(SimTime(0), 70.0);
        assert_eq!(adjusted, 0);
        assert!(registry.relationship(a, b).is_none());
    }

    #[test]
    fn test_drift_applies_compatibility_over_conflict() {
        let mut registry = FactionRegistry::new();
        let a = registry.create(
            "Ravens",
            vec![FactionValue::new(ValueKind::Honor, 80.0)],
            None,
        );
        let b = registry.create(
            "Boars",
            vec![FactionValue::new(ValueKind::Honor, 60.0)],
            None,
        );

        // Compatibility 100, no goal conflict: +10 per pass
        registry.drift_relationships(SimTime(0), 70.0);
        let rel = registry.relationship(a, b).unwrap();
        assert_eq!(rel.attitude(), 10.0);
        assert_eq!(rel.history.len(), 1);
    }

    #[test]
    fn test_drift_zero_adjustment_leaves_no_history() {
        use crate::core::types::ResourceId;

        // No declared values gives baseline compatibility 50; two shared
        // territory claims (40) plus one shared resource claim (10) balance
        // it exactly, so the pass must record nothing for this pair.
        let (mut registry, a, b) = registry_with_two();
        for i in 0..2 {
            let t = TerritoryId(i);
            registry.add_goal(a, GoalKind::Territory, "t", "", 5.0, Some(GoalTarget::Territory(t)));
            registry.add_goal(b, GoalKind::Territory, "t", "", 5.0, Some(GoalTarget::Territory(t)));
        }
        let r = ResourceId(9);
        registry.add_goal(a, GoalKind::Resource, "r", "", 5.0, Some(GoalTarget::Resource(r)));
        registry.add_goal(b, GoalKind::Resource, "r", "", 5.0, Some(GoalTarget::Resource(r)));

        let adjusted = registry.drift_relationships(SimTime(0), 70.0);
        assert_eq!(adjusted, 0);
        assert!(registry.relationship(a, b).is_none());
    }

    #[test]
    fn test_drift_contested_claim_dampens_warming() {
        let (mut registry, a, b) = registry_with_two();
        let t = TerritoryId(1);
        registry.add_goal(a, GoalKind::Territory, "t", "", 5.0, Some(GoalTarget::Territory(t)));
        registry.add_goal(b, GoalKind::Territory, "t", "", 5.0, Some(GoalTarget::Territory(t)));
        registry.add_goal(a, GoalKind::Territory, "u", "", 5.0, Some(GoalTarget::Territory(TerritoryId(2))));

        // Compatibility 50 against one contested claim (20): +3 per pass
        let adjusted = registry.drift_relationships(SimTime(0), 70.0);
        assert_eq!(adjusted, 1);
        assert_eq!(registry.relationship(a, b).unwrap().attitude(), 3.0);
    }
}
