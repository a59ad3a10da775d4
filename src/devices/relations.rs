//! Intra-device relations.
//!
//! A relation is a directed internal path between two pins of the same
//! device. Every relation set is closed under reversal: each relation carries
//! the key of its mirror, and the mirror points back.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// How a relation conducts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// Plain continuity (ground or bus tie)
    Direct,
    /// Forward signal tap
    SignalD,
    /// Return signal tap
    SignalR,
    /// Terminal sink
    Out,
}

impl RelationType {
    /// Whether this relation is a directional signal tap.
    pub fn is_tap(&self) -> bool {
        matches!(self, Self::SignalD | Self::SignalR)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "DIRECT",
            Self::SignalD => "SIGNAL_D",
            Self::SignalR => "SIGNAL_R",
            Self::Out => "OUT",
        };
        f.write_str(name)
    }
}

/// Ordered pin pair addressing a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RelationKey {
    pub from: usize,
    pub to: usize,
}

impl RelationKey {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Key of the opposite direction.
    pub const fn reverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.from, self.to)
    }
}

/// A directed internal edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub from: usize,
    pub to: usize,
    #[serde(rename = "type")]
    pub kind: RelationType,
    pub active: bool,
    /// Key of the paired reverse relation
    pub reverse: RelationKey,
}

impl Relation {
    pub fn key(&self) -> RelationKey {
        RelationKey::new(self.from, self.to)
    }
}

/// Relations of one device, keyed by ordered pin pair.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RelationSet {
    relations: BTreeMap<RelationKey, Relation>,
}

impl RelationSet {
    /// Look up a relation.
    pub fn get(&self, key: RelationKey) -> Option<&Relation> {
        self.relations.get(&key)
    }

    /// Iterate over every relation in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Active relations leaving `pin`.
    pub fn active_from(&self, pin: usize) -> impl Iterator<Item = &Relation> {
        self.relations
            .values()
            .filter(move |r| r.from == pin && r.active)
    }

    /// Set the `active` flag on one relation and its reverse.
    /// Returns `false` if the key is unknown.
    pub fn set_active(&mut self, key: RelationKey, active: bool) -> bool {
        let reverse = match self.relations.get_mut(&key) {
            Some(relation) => {
                relation.active = active;
                relation.reverse
            }
            None => return false,
        };
        if let Some(mirror) = self.relations.get_mut(&reverse) {
            mirror.active = active;
        }
        true
    }

    /// Deactivate every relation.
    pub fn deactivate_all(&mut self) {
        for relation in self.relations.values_mut() {
            relation.active = false;
        }
    }

    /// Keys whose reverse link is missing or does not point back.
    pub fn unpaired(&self) -> Vec<RelationKey> {
        self.relations
            .values()
            .filter(|r| {
                self.relations
                    .get(&r.reverse)
                    .map_or(true, |mirror| mirror.reverse != r.key())
            })
            .map(Relation::key)
            .collect()
    }
}

/// Build a relation set from a partial map of directed relations.
///
/// Entries whose reverse pair is not listed get a synthesized reverse of the
/// same type. All relations start active.
pub fn build_relations(spec: &[(usize, usize, RelationType)]) -> RelationSet {
    let mut relations = BTreeMap::new();

    for &(from, to, kind) in spec {
        let key = RelationKey::new(from, to);
        relations.insert(
            key,
            Relation {
                from,
                to,
                kind,
                active: true,
                reverse: key.reverse(),
            },
        );
    }

    for &(from, to, kind) in spec {
        let reverse = RelationKey::new(to, from);
        relations.entry(reverse).or_insert(Relation {
            from: to,
            to: from,
            kind,
            active: true,
            reverse: reverse.reverse(),
        });
    }

    RelationSet { relations }
}
