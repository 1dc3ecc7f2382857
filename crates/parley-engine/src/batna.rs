//! Best-alternative (bank/port trade) resolution.
//!
//! The best reachable bank or port trade is the negotiation baseline:
//! it needs no opponent's consent, so no negotiated trade is worth
//! accepting unless it beats or ties this alternative. The resolver
//! searches greedily, preferring to spend surplus the build plan does not
//! want, and targets the scarcest missing resource first.

use rust_decimal::Decimal;

use parley_types::{PlayerId, PortFlags, Resource, ResourceSet, TradeOffer};

use crate::estimator::ProductionEstimator;

/// Find the best bank/port trade toward `target` from `available`.
///
/// Types are partitioned into needed (target amount > 0) and not-needed,
/// each ordered scarcest first (ascending production frequency). The
/// trade ratio per give type comes from the player's ports (2:1 specific,
/// 3:1 generic, 4:1 otherwise). Not-needed surplus is spent first; needed
/// types are spent only from the excess above the target amount. The
/// first trade reachable under this ordering wins.
///
/// Returns `None` when every needed resource is already held or no
/// surplus meets any ratio.
pub fn resolve_batna(
    seat: PlayerId,
    target: &ResourceSet,
    available: &ResourceSet,
    ports: &PortFlags,
    estimator: &dyn ProductionEstimator,
) -> Option<TradeOffer> {
    let rates = estimator.rolls_per_resource();
    let rate_of =
        |resource: Resource| rates.get(&resource).copied().unwrap_or(Decimal::ZERO);

    // The scarcest resource the plan still lacks.
    let mut missing: Vec<Resource> = Resource::KNOWN
        .iter()
        .copied()
        .filter(|resource| available.count(*resource) < target.count(*resource))
        .collect();
    missing.sort_by(|a, b| rate_of(*a).cmp(&rate_of(*b)));
    let get_type = missing.first().copied()?;

    let mut not_needed: Vec<Resource> = Resource::KNOWN
        .iter()
        .copied()
        .filter(|resource| target.count(*resource) == 0)
        .collect();
    not_needed.sort_by(|a, b| rate_of(*a).cmp(&rate_of(*b)));

    for give_type in not_needed {
        let ratio = ports.ratio_for(give_type);
        if available.count(give_type) >= ratio {
            return Some(bank_trade(seat, give_type, ratio, get_type));
        }
    }

    // Fall back to needed types held beyond the plan's requirement.
    let mut needed: Vec<Resource> = Resource::KNOWN
        .iter()
        .copied()
        .filter(|resource| target.count(*resource) > 0)
        .collect();
    needed.sort_by(|a, b| rate_of(*a).cmp(&rate_of(*b)));

    for give_type in needed {
        let ratio = ports.ratio_for(give_type);
        let surplus = available
            .count(give_type)
            .saturating_sub(target.count(give_type));
        if surplus >= ratio {
            return Some(bank_trade(seat, give_type, ratio, get_type));
        }
    }

    None
}

fn bank_trade(seat: PlayerId, give: Resource, ratio: u32, get: Resource) -> TradeOffer {
    TradeOffer::bank(
        seat,
        ResourceSet::single(give, ratio),
        ResourceSet::single(get, 1),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
