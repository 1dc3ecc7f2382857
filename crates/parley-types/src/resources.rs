//! Resource types and the [`ResourceSet`] multiset.
//!
//! A [`ResourceSet`] is the currency of every negotiation decision: player
//! hands, offer sides, build costs, and bank trades are all resource
//! multisets. All operations are immutable-arithmetic -- they return new
//! sets rather than mutating in place -- and all counts are clamped at
//! zero, so a set can never hold a negative amount.
//!
//! The map is kept canonical: a zero-count entry is never stored, which
//! makes equality and disjointness checks a matter of comparing the stored
//! keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A resource type in the game.
///
/// `Unknown` stands for cards an observer cannot identify in another
/// player's hand. It never appears in the owner's own view of its own
/// holdings; finding it there signals an upstream inconsistency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Resource {
    /// Clay from riverbank hexes.
    Clay,
    /// Ore from mountain hexes.
    Ore,
    /// Sheep from pasture hexes.
    Sheep,
    /// Wheat from field hexes.
    Wheat,
    /// Wood from forest hexes.
    Wood,
    /// A card whose type the observer cannot see.
    Unknown,
}

impl Resource {
    /// The five identifiable resource types, in canonical order.
    pub const KNOWN: [Self; 5] = [Self::Clay, Self::Ore, Self::Sheep, Self::Wheat, Self::Wood];

    /// Whether this is the [`Resource::Unknown`] placeholder.
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

// ---------------------------------------------------------------------------
// ResourceSet
// ---------------------------------------------------------------------------

/// An immutable-arithmetic multiset of resources.
///
/// Counts are non-negative by construction and zero-count entries are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    counts: BTreeMap<Resource, u32>,
}

impl ResourceSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Create a set holding `amount` of a single resource type.
    ///
    /// A zero `amount` yields the empty set.
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut set = Self::new();
        set.insert(resource, amount);
        set
    }

    /// Add `amount` of `resource` in place, saturating at `u32::MAX`.
    ///
    /// Zero amounts are ignored so the map stays canonical.
    pub fn insert(&mut self, resource: Resource, amount: u32) {
        if amount == 0 {
            return;
        }
        let entry = self.counts.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// The count held of a single resource type.
    pub fn count(&self, resource: Resource) -> u32 {
        self.counts.get(&resource).copied().unwrap_or(0)
    }

    /// Whether at least `amount` of `resource` is held.
    pub fn has(&self, resource: Resource, amount: u32) -> bool {
        self.count(resource) >= amount
    }

    /// Total number of cards in the set, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.counts
            .values()
            .fold(0_u32, |acc, qty| acc.saturating_add(*qty))
    }

    /// Whether the set holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct resource types held.
    pub fn distinct_types(&self) -> usize {
        self.counts.len()
    }

    /// The resource types held, in canonical order.
    pub fn types(&self) -> impl Iterator<Item = Resource> + '_ {
        self.counts.keys().copied()
    }

    /// Iterate over `(resource, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        self.counts.iter().map(|(r, qty)| (*r, *qty))
    }

    /// Whether the set contains any [`Resource::Unknown`] cards.
    pub fn contains_unknown(&self) -> bool {
        self.counts.contains_key(&Resource::Unknown)
    }

    /// Per-type saturating addition.
    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (resource, qty) in other.iter() {
            result.insert(resource, qty);
        }
        result
    }

    /// Per-type subtraction, clamped at zero.
    ///
    /// Subtracting more of a type than is held leaves zero of it rather
    /// than failing.
    pub fn subtract(&self, other: &Self) -> Self {
        let mut result = Self::new();
        for (resource, qty) in self.iter() {
            let remaining = qty.saturating_sub(other.count(resource));
            result.insert(resource, remaining);
        }
        result
    }

    /// Whether every count in `other` is covered by this set (per-type `>=`).
    pub fn contains(&self, other: &Self) -> bool {
        other.iter().all(|(resource, qty)| self.count(resource) >= qty)
    }

    /// Whether the two sets share no nonzero type. Symmetric.
    pub fn disjoint(&self, other: &Self) -> bool {
        self.types().all(|resource| other.count(resource) == 0)
    }

    /// Per-type maximum, used when assembling disjunctive offer sides.
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (resource, qty) in other.iter() {
            let current = result.count(resource);
            if qty > current {
                result.counts.insert(resource, qty);
            }
        }
        result
    }

    /// Equality over the five identifiable types, ignoring `Unknown`.
    pub fn eq_ignoring_unknown(&self, other: &Self) -> bool {
        Resource::KNOWN
            .iter()
            .all(|resource| self.count(*resource) == other.count(*resource))
    }
}

impl FromIterator<(Resource, u32)> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = (Resource, u32)>>(pairs: I) -> Self {
        let mut set = Self::new();
        for (resource, qty) in pairs {
            set.insert(resource, qty);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
