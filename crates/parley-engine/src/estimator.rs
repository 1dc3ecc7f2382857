//! Production-speed estimation: collaborator trait and ETA adapter.
//!
//! The engine never computes dice statistics itself. An external
//! [`ProductionEstimator`] owns the board-dependent math -- expected
//! per-turn production per resource and a bounded search for "how many
//! turns until this target is affordable". The [`EtaEvaluator`] adapter
//! applies a hypothetical trade delta before asking, and absorbs the
//! estimator's bounded-search overflow into [`Eta::UNREACHABLE`] so no
//! error crosses the adapter boundary.
//!
//! [`TableEstimator`] is a deterministic implementation over a fixed rate
//! table, used by tests and offline evaluation in place of the full
//! board-aware estimator.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use parley_types::{Eta, PortFlags, Resource, ResourceSet};

// ---------------------------------------------------------------------------
// ProductionEstimator
// ---------------------------------------------------------------------------

/// A source of production-speed estimates for one player.
///
/// Implementations answer from the player's dice-probability profile:
/// which hexes they sit on, weighted by roll frequency.
pub trait ProductionEstimator {
    /// Expected per-turn production per resource type.
    ///
    /// Types the player cannot produce at all may be absent from the map.
    fn rolls_per_resource(&self) -> BTreeMap<Resource, Decimal>;

    /// Expected number of turns until `target` is affordable from
    /// `current`, given the player's ports.
    ///
    /// Returns `None` when the bounded search cannot bound the answer
    /// within its horizon.
    fn turns_to_reach(
        &self,
        current: &ResourceSet,
        target: &ResourceSet,
        ports: &PortFlags,
    ) -> Option<u32>;
}

// ---------------------------------------------------------------------------
// EtaEvaluator
// ---------------------------------------------------------------------------

/// Adapter converting a hypothetical trade delta into a bounded [`Eta`].
#[derive(Clone, Copy)]
pub struct EtaEvaluator<'a> {
    estimator: &'a dyn ProductionEstimator,
}

impl<'a> EtaEvaluator<'a> {
    /// Wrap an estimator.
    pub const fn new(estimator: &'a dyn ProductionEstimator) -> Self {
        Self { estimator }
    }

    /// Turns to reach `target` after applying `current - give + get`.
    ///
    /// The subtraction clamps at zero, and a `None` from the estimator
    /// becomes [`Eta::UNREACHABLE`]; the caller never sees an error.
    pub fn eta(
        &self,
        current: &ResourceSet,
        target: &ResourceSet,
        give: &ResourceSet,
        get: &ResourceSet,
        ports: &PortFlags,
    ) -> Eta {
        let hypothetical = current.subtract(give).add(get);
        self.estimator
            .turns_to_reach(&hypothetical, target, ports)
            .map_or(Eta::UNREACHABLE, Eta::new)
    }
}

// ---------------------------------------------------------------------------
// TableEstimator
// ---------------------------------------------------------------------------

/// A deterministic estimator over a fixed per-resource rate table.
///
/// The model is pure accumulation: each missing resource arrives at its
/// table rate, so the answer is the slowest deficit,
/// `max(ceil(deficit / rate))`. A deficit in a resource with no production
/// rate, or an answer beyond the horizon, is unbounded.
#[derive(Debug, Clone)]
pub struct TableEstimator {
    rates: BTreeMap<Resource, Decimal>,
    horizon: u32,
}

impl TableEstimator {
    /// Default search horizon in turns.
    pub const DEFAULT_HORIZON: u32 = 100;

    /// Create an estimator from `(resource, expected per-turn production)`
    /// pairs.
    pub fn new(rates: &[(Resource, Decimal)]) -> Self {
        Self {
            rates: rates.iter().copied().collect(),
            horizon: Self::DEFAULT_HORIZON,
        }
    }

    /// Create an estimator producing every known resource at the same rate.
    pub fn uniform(rate: Decimal) -> Self {
        let rates: Vec<(Resource, Decimal)> = Resource::KNOWN
            .iter()
            .map(|resource| (*resource, rate))
            .collect();
        Self::new(&rates)
    }

    /// Replace the search horizon.
    #[must_use]
    pub const fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    fn turns_for_deficit(&self, resource: Resource, deficit: u32) -> Option<u32> {
        let rate = self.rates.get(&resource).copied().unwrap_or(Decimal::ZERO);
        if rate <= Decimal::ZERO {
            return None;
        }
        Decimal::from(deficit)
            .checked_div(rate)
            .map(|turns| turns.ceil())
            .and_then(|turns| turns.to_u32())
    }
}

impl ProductionEstimator for TableEstimator {
    fn rolls_per_resource(&self) -> BTreeMap<Resource, Decimal> {
        self.rates.clone()
    }

    fn turns_to_reach(
        &self,
        current: &ResourceSet,
        target: &ResourceSet,
        _ports: &PortFlags,
    ) -> Option<u32> {
        let mut slowest: u32 = 0;
        for (resource, wanted) in target.iter() {
            let deficit = wanted.saturating_sub(current.count(resource));
            if deficit == 0 {
                continue;
            }
            let turns = self.turns_for_deficit(resource, deficit)?;
            slowest = slowest.max(turns);
        }
        (slowest <= self.horizon).then_some(slowest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
