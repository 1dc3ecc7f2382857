//! Offer catalog generation.
//!
//! Enumerates every resource-for-resource offer obtainable from the
//! current hand: the 1-for-1 grid over held give types and distinct get
//! types, optionally extended with give-2-for-1 and 1-for-2 variants.
//! The space is small (at most 5 x 4 x 3 shapes), so the catalog is
//! intentionally exhaustive rather than sampled -- completeness keeps the
//! agent's behavior consistent from turn to turn.
//!
//! Recipients are pre-filtered by the caller; the generator addresses
//! every offer to the recipient set it is handed.

use std::collections::BTreeSet;

use parley_types::{PlayerId, Resource, ResourceSet, TradeOffer};

use crate::policy::CatalogPolicy;

/// Enumerate all legal offer shapes from the current hand.
///
/// For each held resource type as the give side and each other known
/// type as the get side, emits the 1-for-1 offer; when enabled by
/// `policy`, also the give-2-for-1 variant (if two are held) and the
/// 1-for-2 variant.
pub fn legal_offers(
    current: &ResourceSet,
    from: PlayerId,
    recipients: &BTreeSet<PlayerId>,
    policy: &CatalogPolicy,
) -> Vec<TradeOffer> {
    let mut offers = Vec::new();

    for give_type in Resource::KNOWN {
        let held = current.count(give_type);
        if held == 0 {
            continue;
        }
        for get_type in Resource::KNOWN {
            if get_type == give_type {
                continue;
            }

            offers.push(shape(from, recipients, give_type, 1, get_type, 1));

            if policy.allow_two_for_one && held >= 2 {
                offers.push(shape(from, recipients, give_type, 2, get_type, 1));
            }
            if policy.allow_one_for_two {
                offers.push(shape(from, recipients, give_type, 1, get_type, 2));
            }
        }
    }

    offers
}

fn shape(
    from: PlayerId,
    recipients: &BTreeSet<PlayerId>,
    give_type: Resource,
    give_amount: u32,
    get_type: Resource,
    get_amount: u32,
) -> TradeOffer {
    TradeOffer::addressed(
        from,
        recipients.clone(),
        ResourceSet::single(give_type, give_amount),
        ResourceSet::single(get_type, get_amount),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn recipients() -> BTreeSet<PlayerId> {
        [PlayerId::new(1), PlayerId::new(2)].into_iter().collect()
    }

    fn set(pairs: &[(Resource, u32)]) -> ResourceSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_hand_yields_no_offers() {
        let offers = legal_offers(
            &ResourceSet::new(),
            PlayerId::new(0),
            &recipients(),
            &CatalogPolicy::default(),
        );
        assert!(offers.is_empty());
    }

    #[test]
    fn single_held_type_spans_all_get_types() {
        let offers = legal_offers(
            &set(&[(Resource::Wood, 1)]),
            PlayerId::new(0),
            &recipients(),
            &CatalogPolicy {
                allow_two_for_one: false,
                allow_one_for_two: false,
            },
        );
        // 1-for-1 against each of the other four known types.
        assert_eq!(offers.len(), 4);
        assert!(offers.iter().all(|offer| {
            offer.give == ResourceSet::single(Resource::Wood, 1) && offer.get.total() == 1
        }));
    }

    #[test]
    fn two_for_one_requires_two_held() {
        let policy = CatalogPolicy {
            allow_two_for_one: true,
            allow_one_for_two: false,
        };
        let single = legal_offers(
            &set(&[(Resource::Wood, 1)]),
            PlayerId::new(0),
            &recipients(),
            &policy,
        );
        assert_eq!(single.len(), 4);

        let double = legal_offers(
            &set(&[(Resource::Wood, 2)]),
            PlayerId::new(0),
            &recipients(),
            &policy,
        );
        // Each get type now has a 1-for-1 and a 2-for-1 shape.
        assert_eq!(double.len(), 8);
        assert!(
            double
                .iter()
                .any(|offer| offer.give == ResourceSet::single(Resource::Wood, 2))
        );
    }

    #[test]
    fn full_hand_hits_the_catalog_bound() {
        let hand = set(&[
            (Resource::Clay, 2),
            (Resource::Ore, 2),
            (Resource::Sheep, 2),
            (Resource::Wheat, 2),
            (Resource::Wood, 2),
        ]);
        let offers = legal_offers(
            &hand,
            PlayerId::new(0),
            &recipients(),
            &CatalogPolicy::default(),
        );
        // 5 give types x 4 get types x 3 shapes.
        assert_eq!(offers.len(), 60);
    }

    #[test]
    fn offers_carry_the_recipient_set() {
        let offers = legal_offers(
            &set(&[(Resource::Ore, 1)]),
            PlayerId::new(0),
            &recipients(),
            &CatalogPolicy::default(),
        );
        assert!(offers.iter().all(|offer| offer.to == recipients()));
    }

    #[test]
    fn unknown_is_never_offered() {
        let hand = set(&[(Resource::Wood, 1), (Resource::Unknown, 3)]);
        let offers = legal_offers(
            &hand,
            PlayerId::new(0),
            &recipients(),
            &CatalogPolicy::default(),
        );
        assert!(offers.iter().all(|offer| {
            !offer.give.contains_unknown() && !offer.get.contains_unknown()
        }));
    }
}
