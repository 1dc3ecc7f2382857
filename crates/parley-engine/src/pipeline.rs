//! Candidate filtering and aggregation pipeline.
//!
//! Raw catalog offers pass through a fixed sequence of removal filters --
//! baseline, legality, likelihood, history, reverse-exchange, plan
//! safety, blocked resources -- followed by an aggregation pass that
//! merges compatible survivors into disjunctive or partial offers. Each
//! filter only removes entries (or narrows an offer's recipient set); none
//! reorders, so re-running the pipeline on its own output changes
//! nothing.
//!
//! The stage order matters: cheap plausibility checks run before the
//! response predictions, and history-based pruning runs before
//! aggregation so merged offers are built only from exchanges still worth
//! making.

use std::collections::VecDeque;

use rust_decimal::Decimal;

use parley_types::{PlayerId, RatedOffer, ResourceSet, TradeOffer};

use crate::context::NegotiationContext;
use crate::oracle::{own_baseline, plausibly_holds, predict_response};

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Annotate each offer with its plan and global turn estimates.
pub fn rate_offers(
    offers: Vec<TradeOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    offers
        .into_iter()
        .map(|offer| {
            let eta = ctx.eta_after(&offer.give, &offer.get);
            let global_eta = ctx.global_eta_after(&offer.give, &offer.get);
            RatedOffer::new(offer, eta, global_eta)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Removal filters
// ---------------------------------------------------------------------------

/// Drop offers slower than the acting player's own baseline.
pub fn filter_by_batna(rated: Vec<RatedOffer>, baseline: &RatedOffer) -> Vec<RatedOffer> {
    rated
        .into_iter()
        .filter(|candidate| candidate.eta <= baseline.eta)
        .collect()
}

/// Drop recipients who implausibly hold the requested resources; drop the
/// offer entirely when no recipient remains.
pub fn filter_legal_recipients(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    let mode = ctx.policy.acceptance.plausibility;
    rated
        .into_iter()
        .filter_map(|mut candidate| {
            candidate.offer.to.retain(|recipient| {
                plausibly_holds(
                    &ctx.beliefs.believed_resources(*recipient),
                    &candidate.offer.get,
                    mode,
                )
            });
            (!candidate.offer.to.is_empty()).then_some(candidate)
        })
        .collect()
}

/// Drop recipients who are embargoed, not believed to be selling any
/// requested type, stonewalling (a recorded acceptance rate of zero), or
/// predicted to refuse; drop empty offers.
pub fn filter_likely_recipients(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    rated
        .into_iter()
        .filter_map(|mut candidate| {
            let keep: Vec<_> = candidate
                .offer
                .to
                .iter()
                .copied()
                .filter(|recipient| {
                    !ctx.beliefs.is_embargoed(*recipient)
                        && is_selling_any(*recipient, &candidate.offer.get, ctx)
                        && is_ever_accepting(*recipient, ctx)
                        && predict_response(&candidate.offer, *recipient, ctx)
                })
                .collect();
            candidate.offer.to = keep.into_iter().collect();
            (!candidate.offer.to.is_empty()).then_some(candidate)
        })
        .collect()
}

/// Whether a player has ever accepted one of this agent's offers.
///
/// No recorded responses means no signal; only a tallied rate of zero
/// marks a player as not worth asking.
fn is_ever_accepting(player: PlayerId, ctx: &NegotiationContext<'_>) -> bool {
    ctx.beliefs
        .acceptance_rate(player)
        .is_none_or(|rate| rate > Decimal::ZERO)
}

/// Whether a player is believed willing to part with any requested type.
///
/// With no explicit selling signal, believing they hold more of a type
/// than their predicted plan requires counts as selling.
fn is_selling_any(
    player: PlayerId,
    requested: &ResourceSet,
    ctx: &NegotiationContext<'_>,
) -> bool {
    let believed = ctx.beliefs.believed_resources(player);
    let plan_target = ctx.beliefs.predicted_plan(player).full_target();
    requested.types().any(|resource| {
        ctx.beliefs.is_selling(player, resource).unwrap_or_else(|| {
            believed.count(resource) > plan_target.count(resource)
        })
    })
}

/// Drop offers that are strict non-improvements over past offers to the
/// same recipients: giving no more for the same ask, or asking no less
/// for the same payment.
pub fn filter_history(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    rated
        .into_iter()
        .filter(|candidate| !is_non_improvement(&candidate.offer, ctx))
        .collect()
}

fn is_non_improvement(offer: &TradeOffer, ctx: &NegotiationContext<'_>) -> bool {
    ctx.beliefs.past_offers().iter().any(|past| {
        if past.to != offer.to {
            return false;
        }
        let same_get_weaker_give =
            past.get == offer.get && past.give.contains(&offer.give);
        let same_give_greedier_get =
            past.give == offer.give && offer.get.contains(&past.get);
        same_get_weaker_give || same_give_greedier_get
    })
}

/// Drop single-recipient offers that would reverse a just-completed trade
/// with that player.
pub fn filter_reverse_exchange(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    rated
        .into_iter()
        .filter(|candidate| {
            if candidate.offer.to.len() != 1 {
                return true;
            }
            let Some(recipient) = candidate.offer.to.iter().next().copied() else {
                return true;
            };
            let Some(trade) = ctx.beliefs.last_completed_with(recipient) else {
                return true;
            };
            // Asking back what we sold, or returning what we bought.
            candidate.offer.get.disjoint(&trade.gave)
                && candidate.offer.give.disjoint(&trade.received)
        })
        .collect()
}

/// Drop offers whose give side eats into resources the build plan still
/// needs beyond the currently spare amounts.
pub fn filter_plan_safety(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    let spare = ctx.resources.subtract(&ctx.target());
    rated
        .into_iter()
        .filter(|candidate| spare.contains(&candidate.offer.give))
        .collect()
}

/// Drop offers requesting a resource type under an active self-imposed
/// block.
pub fn filter_blocked_resources(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    let blocked = ctx.beliefs.blocked_resources();
    if blocked.is_empty() {
        return rated;
    }
    rated
        .into_iter()
        .filter(|candidate| {
            candidate
                .offer
                .get
                .types()
                .all(|resource| !blocked.contains(&resource))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Merge compatible offers to identical recipients into disjunctive or
/// partial forms, then sort ascending by `(eta, global_eta)`.
///
/// Two offers merge when one side is equal and the other differs. When
/// both differing sides are single-resource and disjoint, and the merged
/// offer stays within the configured type limit, the merge is
/// disjunctive; otherwise, when policy allows, the differing side is
/// cleared into a partial offer. A merged offer inherits the better
/// estimates of its inputs and is dropped if it repeats the offer log or
/// its inputs' estimates diverge beyond the configured cap.
pub fn aggregate_offers(
    rated: Vec<RatedOffer>,
    ctx: &NegotiationContext<'_>,
) -> Vec<RatedOffer> {
    let mut remaining: VecDeque<RatedOffer> = rated.into();
    let mut merged_out: Vec<RatedOffer> = Vec::new();

    while let Some(mut current) = remaining.pop_front() {
        let mut unmerged: VecDeque<RatedOffer> = VecDeque::new();
        while let Some(next) = remaining.pop_front() {
            match try_merge(&current, &next, ctx) {
                Some(merged) => current = merged,
                None => unmerged.push_back(next),
            }
        }
        remaining = unmerged;
        merged_out.push(current);
    }

    merged_out.sort_by_key(RatedOffer::rank_key);
    merged_out
}

fn try_merge(
    a: &RatedOffer,
    b: &RatedOffer,
    ctx: &NegotiationContext<'_>,
) -> Option<RatedOffer> {
    if a.offer.to != b.offer.to || a.offer.to.is_empty() {
        return None;
    }
    if a.offer.is_partial() || b.offer.is_partial() {
        return None;
    }

    if let Some(cap) = ctx.policy.aggregation.max_eta_divergence {
        if a.eta.turns().abs_diff(b.eta.turns()) > cap {
            return None;
        }
    }

    let merged = if a.offer.give == b.offer.give
        && !a.offer.give_is_disjunctive
        && !b.offer.give_is_disjunctive
        && a.offer.get != b.offer.get
    {
        merge_side(
            a,
            b,
            &a.offer.give,
            &a.offer.get,
            &b.offer.get,
            MergedSide::Get,
            ctx,
        )
    } else if a.offer.get == b.offer.get
        && !a.offer.get_is_disjunctive
        && !b.offer.get_is_disjunctive
        && a.offer.give != b.offer.give
    {
        merge_side(
            a,
            b,
            &a.offer.get,
            &a.offer.give,
            &b.offer.give,
            MergedSide::Give,
            ctx,
        )
    } else {
        None
    }?;

    // A merge that repeats the offer log is not worth making.
    (!ctx.beliefs.was_offered(&merged.offer)).then_some(merged)
}

/// Which side of the offer a merge combines.
enum MergedSide {
    Give,
    Get,
}

fn merge_side(
    a: &RatedOffer,
    b: &RatedOffer,
    equal_side: &ResourceSet,
    left: &ResourceSet,
    right: &ResourceSet,
    which: MergedSide,
    ctx: &NegotiationContext<'_>,
) -> Option<RatedOffer> {
    let policy = &ctx.policy.aggregation;
    let single_resource = left.distinct_types() == 1 && right.distinct_types() == 1;
    let combined_types = equal_side
        .distinct_types()
        .saturating_add(left.union(right).distinct_types());

    let (merged_set, disjunctive) = if single_resource
        && left.disjoint(right)
        && combined_types <= policy.max_merged_types
    {
        (left.union(right), true)
    } else if policy.allow_partial_merge {
        (ResourceSet::new(), false)
    } else {
        return None;
    };

    let mut offer = a.offer.clone();
    match which {
        MergedSide::Get => {
            offer.get = merged_set;
            offer.get_is_disjunctive = disjunctive;
        }
        MergedSide::Give => {
            offer.give = merged_set;
            offer.give_is_disjunctive = disjunctive;
        }
    }

    Some(RatedOffer::new(
        offer,
        a.eta.min(b.eta),
        a.global_eta.min(b.global_eta),
    ))
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

/// Run every filter in order, then aggregate and rank.
pub fn run(offers: Vec<TradeOffer>, ctx: &NegotiationContext<'_>) -> Vec<RatedOffer> {
    let baseline = own_baseline(ctx);
    let mut rated = rate_offers(offers, ctx);

    rated = filter_by_batna(rated, &baseline);
    rated = filter_legal_recipients(rated, ctx);
    rated = filter_likely_recipients(rated, ctx);
    if ctx.policy.pipeline.history_filter {
        rated = filter_history(rated, ctx);
    }
    if ctx.policy.pipeline.reverse_exchange_filter {
        rated = filter_reverse_exchange(rated, ctx);
    }
    if ctx.policy.pipeline.plan_safety_filter {
        rated = filter_plan_safety(rated, ctx);
    }
    rated = filter_blocked_resources(rated, ctx);

    aggregate_offers(rated, ctx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use parley_types::{BuildPlan, Eta, GameView, Piece, Resource};

    use crate::belief::{BeliefStore, CompletedTrade, InMemoryBeliefStore};
    use crate::estimator::TableEstimator;
    use crate::policy::{NegotiationPolicy, PlausibilityMode};

    use super::*;

    fn set(pairs: &[(Resource, u32)]) -> ResourceSet {
        pairs.iter().copied().collect()
    }

    fn recipients(seats: &[u8]) -> BTreeSet<PlayerId> {
        seats.iter().map(|seat| PlayerId::new(*seat)).collect()
    }

    struct Fixture {
        resources: ResourceSet,
        plan: BuildPlan,
        view: GameView,
        policy: NegotiationPolicy,
        estimator: TableEstimator,
        beliefs: InMemoryBeliefStore,
    }

    impl Fixture {
        fn new() -> Self {
            let mut view = GameView {
                seat: PlayerId::new(0),
                max_players: 4,
                ..GameView::default()
            };
            for seat in 0..4 {
                view.scores.insert(PlayerId::new(seat), 3);
            }
            Self {
                // One road away, short a clay; two spare sheep.
                resources: set(&[(Resource::Wood, 1), (Resource::Sheep, 2)]),
                plan: BuildPlan::new(vec![Piece::Road]),
                view,
                policy: NegotiationPolicy::default(),
                estimator: TableEstimator::new(&[
                    (Resource::Clay, Decimal::new(25, 2)),
                    (Resource::Ore, Decimal::new(25, 2)),
                    (Resource::Sheep, Decimal::ONE),
                    (Resource::Wheat, Decimal::ONE),
                    (Resource::Wood, Decimal::new(2, 1)),
                ]),
                beliefs: InMemoryBeliefStore::new(),
            }
        }

        /// Make seat 1 a willing, predicted-to-accept clay seller.
        fn with_clay_seller(mut self) -> Self {
            let seller = PlayerId::new(1);
            self.beliefs
                .set_predicted_plan(seller, BuildPlan::new(vec![Piece::Settlement]));
            self.beliefs.set_believed_resources(
                seller,
                set(&[(Resource::Clay, 2), (Resource::Wood, 1), (Resource::Wheat, 1)]),
            );
            self
        }

        fn ctx(&mut self) -> NegotiationContext<'_> {
            NegotiationContext {
                seat: PlayerId::new(0),
                resources: &self.resources,
                plan: &self.plan,
                view: &self.view,
                policy: &self.policy,
                estimator: &self.estimator,
                beliefs: &mut self.beliefs,
            }
        }
    }

    fn sheep_for_clay(to: &BTreeSet<PlayerId>) -> TradeOffer {
        TradeOffer::addressed(
            PlayerId::new(0),
            to.clone(),
            ResourceSet::single(Resource::Sheep, 1),
            ResourceSet::single(Resource::Clay, 1),
        )
    }

    // -----------------------------------------------------------------------
    // Removal filters
    // -----------------------------------------------------------------------

    #[test]
    fn batna_filter_drops_slower_offers() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx();
        // No bank trade exists, so the baseline is standing pat at 4 turns.
        let baseline = own_baseline(&ctx);
        assert_eq!(baseline.eta, Eta::new(4));

        let offers = vec![
            sheep_for_clay(&recipients(&[1])), // immediate build: eta 0
            TradeOffer::addressed(
                PlayerId::new(0),
                recipients(&[1]),
                ResourceSet::single(Resource::Wood, 1), // gives away the plan's wood
                ResourceSet::single(Resource::Wheat, 1),
            ),
        ];
        let rated = rate_offers(offers, &ctx);
        let kept = filter_by_batna(rated, &baseline);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().map(|candidate| candidate.eta), Some(Eta::ZERO));
    }

    #[test]
    fn legality_filter_narrows_to_plausible_recipients() {
        let mut fixture = Fixture::new();
        fixture.policy.acceptance.plausibility = PlausibilityMode::Pessimistic;
        fixture
            .beliefs
            .set_believed_resources(PlayerId::new(1), set(&[(Resource::Clay, 1)]));
        fixture
            .beliefs
            .set_believed_resources(PlayerId::new(2), ResourceSet::new());
        fixture
            .beliefs
            .set_believed_resources(PlayerId::new(3), set(&[(Resource::Clay, 2)]));

        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1, 2, 3]))], &ctx);
        let kept = filter_legal_recipients(rated, &ctx);

        assert_eq!(kept.len(), 1);
        assert_eq!(
            kept.first().map(|candidate| candidate.offer.to.clone()),
            Some(recipients(&[1, 3]))
        );
    }

    #[test]
    fn legality_filter_drops_offer_with_no_plausible_recipient() {
        let mut fixture = Fixture::new();
        fixture.policy.acceptance.plausibility = PlausibilityMode::Pessimistic;
        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1, 2]))], &ctx);
        assert!(filter_legal_recipients(rated, &ctx).is_empty());
    }

    #[test]
    fn likelihood_filter_honors_selling_signals() {
        let mut fixture = Fixture::new().with_clay_seller();
        // An explicit not-selling signal overrides the derived one.
        fixture
            .beliefs
            .set_selling(PlayerId::new(1), Resource::Clay, false);
        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        assert!(filter_likely_recipients(rated, &ctx).is_empty());
    }

    #[test]
    fn likelihood_filter_keeps_predicted_accepters() {
        let mut fixture = Fixture::new().with_clay_seller();
        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        let kept = filter_likely_recipients(rated, &ctx);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn likelihood_filter_skips_stonewalling_recipients() {
        let mut fixture = Fixture::new().with_clay_seller();
        // Seat 1 has rejected everything we ever offered.
        fixture.beliefs.record_response(PlayerId::new(1), false);
        {
            let ctx = fixture.ctx();
            let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
            assert!(filter_likely_recipients(rated, &ctx).is_empty());
        }

        // One recorded acceptance puts them back in play.
        fixture.beliefs.record_response(PlayerId::new(1), true);
        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        assert_eq!(filter_likely_recipients(rated, &ctx).len(), 1);
    }

    #[test]
    fn likelihood_filter_drops_embargoed_recipients() {
        let mut fixture = Fixture::new().with_clay_seller();
        fixture.beliefs.set_embargo(PlayerId::new(1), 5);
        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        assert!(filter_likely_recipients(rated, &ctx).is_empty());
    }

    #[test]
    fn history_filter_drops_strict_non_improvements() {
        let mut fixture = Fixture::new();
        // We previously offered two sheep for the same clay.
        fixture.beliefs.record_offer(TradeOffer::addressed(
            PlayerId::new(0),
            recipients(&[1]),
            ResourceSet::single(Resource::Sheep, 2),
            ResourceSet::single(Resource::Clay, 1),
        ));
        let ctx = fixture.ctx();

        // Offering less for the same ask goes nowhere.
        let weaker = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        assert!(filter_history(weaker, &ctx).is_empty());

        // Sweetening the give side survives.
        let sweeter = rate_offers(
            vec![TradeOffer::addressed(
                PlayerId::new(0),
                recipients(&[1]),
                set(&[(Resource::Sheep, 2), (Resource::Wheat, 1)]),
                ResourceSet::single(Resource::Clay, 1),
            )],
            &ctx,
        );
        assert_eq!(filter_history(sweeter, &ctx).len(), 1);
    }

    #[test]
    fn reverse_exchange_filter_blocks_buybacks() {
        let mut fixture = Fixture::new();
        fixture.beliefs.record_completed(CompletedTrade {
            with: PlayerId::new(1),
            gave: ResourceSet::single(Resource::Sheep, 1),
            received: ResourceSet::single(Resource::Clay, 1),
            turn: 4,
        });
        let ctx = fixture.ctx();

        // Asking back the sheep we just sold to seat 1.
        let buyback = rate_offers(
            vec![TradeOffer::addressed(
                PlayerId::new(0),
                recipients(&[1]),
                ResourceSet::single(Resource::Wood, 1),
                ResourceSet::single(Resource::Sheep, 1),
            )],
            &ctx,
        );
        assert!(filter_reverse_exchange(buyback, &ctx).is_empty());

        // The same ask to a different player is fine.
        let elsewhere = rate_offers(
            vec![TradeOffer::addressed(
                PlayerId::new(0),
                recipients(&[2]),
                ResourceSet::single(Resource::Wood, 1),
                ResourceSet::single(Resource::Sheep, 1),
            )],
            &ctx,
        );
        assert_eq!(filter_reverse_exchange(elsewhere, &ctx).len(), 1);
    }

    #[test]
    fn plan_safety_filter_protects_required_resources() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx();
        let offers = vec![
            // Gives away the wood the road still needs.
            TradeOffer::addressed(
                PlayerId::new(0),
                recipients(&[1]),
                ResourceSet::single(Resource::Wood, 1),
                ResourceSet::single(Resource::Clay, 1),
            ),
            // Spends a spare sheep instead.
            sheep_for_clay(&recipients(&[1])),
        ];
        let kept = filter_plan_safety(rate_offers(offers, &ctx), &ctx);
        assert_eq!(kept.len(), 1);
        assert_eq!(
            kept.first().map(|candidate| candidate.offer.give.clone()),
            Some(ResourceSet::single(Resource::Sheep, 1))
        );
    }

    #[test]
    fn blocked_resource_filter_drops_blocked_requests() {
        let mut fixture = Fixture::new();
        let mut blocked = BTreeSet::new();
        blocked.insert(Resource::Clay);
        fixture.beliefs.set_block(blocked, 3);
        let ctx = fixture.ctx();
        let rated = rate_offers(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        assert!(filter_blocked_resources(rated, &ctx).is_empty());
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    fn rated_pair(get_a: Resource, get_b: Resource, fixture: &mut Fixture) -> Vec<RatedOffer> {
        let ctx = fixture.ctx();
        rate_offers(
            vec![
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    ResourceSet::single(get_a, 1),
                ),
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    ResourceSet::single(get_b, 1),
                ),
            ],
            &ctx,
        )
    }

    #[test]
    fn compatible_single_resource_gets_merge_disjunctively() {
        let mut fixture = Fixture::new();
        let rated = rated_pair(Resource::Wheat, Resource::Sheep, &mut fixture);
        let ctx = fixture.ctx();
        let merged = aggregate_offers(rated, &ctx);

        assert_eq!(merged.len(), 1);
        let offer = merged.first().map(|candidate| candidate.offer.clone());
        let offer = offer.unwrap_or_else(|| {
            TradeOffer::bank(PlayerId::new(0), ResourceSet::new(), ResourceSet::new())
        });
        assert!(offer.get_is_disjunctive);
        assert!(!offer.give_is_disjunctive);
        assert_eq!(offer.give, ResourceSet::single(Resource::Ore, 1));
        assert_eq!(
            offer.get,
            set(&[(Resource::Wheat, 1), (Resource::Sheep, 1)])
        );
    }

    #[test]
    fn merged_offer_inherits_the_better_estimates() {
        let mut fixture = Fixture::new();
        let rated = rated_pair(Resource::Wheat, Resource::Sheep, &mut fixture);
        let best_eta = rated.iter().map(|candidate| candidate.eta).min();
        let ctx = fixture.ctx();
        let merged = aggregate_offers(rated, &ctx);
        assert_eq!(merged.first().map(|candidate| candidate.eta), best_eta);
    }

    #[test]
    fn oversized_merge_falls_back_to_partial() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx();
        // The first get side spans two types, so a disjunctive merge is
        // off the table; policy still allows a partial merge.
        let rated = rate_offers(
            vec![
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    set(&[(Resource::Wheat, 1), (Resource::Wood, 1)]),
                ),
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    ResourceSet::single(Resource::Sheep, 1),
                ),
            ],
            &ctx,
        );
        let merged = aggregate_offers(rated, &ctx);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.first().map(|candidate| candidate.offer.is_partial()),
            Some(true)
        );
    }

    #[test]
    fn merge_respects_the_partial_merge_toggle() {
        let mut fixture = Fixture::new();
        fixture.policy.aggregation.allow_partial_merge = false;
        let ctx = fixture.ctx();
        let rated = rate_offers(
            vec![
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    set(&[(Resource::Wheat, 1), (Resource::Wood, 1)]),
                ),
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    ResourceSet::single(Resource::Sheep, 1),
                ),
            ],
            &ctx,
        );
        // No disjunctive merge possible and partial merges disabled.
        assert_eq!(aggregate_offers(rated, &ctx).len(), 2);
    }

    #[test]
    fn merge_respects_the_eta_divergence_cap() {
        let mut fixture = Fixture::new();
        fixture.policy.aggregation.max_eta_divergence = Some(1);
        let ctx = fixture.ctx();
        let offer_a = TradeOffer::addressed(
            PlayerId::new(0),
            recipients(&[1]),
            ResourceSet::single(Resource::Sheep, 1),
            ResourceSet::single(Resource::Clay, 1), // completes the road: eta 0
        );
        let offer_b = TradeOffer::addressed(
            PlayerId::new(0),
            recipients(&[1]),
            ResourceSet::single(Resource::Sheep, 1),
            ResourceSet::single(Resource::Wheat, 1), // still short a clay: eta 4
        );
        let rated = rate_offers(vec![offer_a, offer_b], &ctx);
        assert_eq!(aggregate_offers(rated, &ctx).len(), 2);
    }

    #[test]
    fn different_recipients_never_merge() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx();
        let rated = rate_offers(
            vec![
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Ore, 1),
                    ResourceSet::single(Resource::Wheat, 1),
                ),
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[2]),
                    ResourceSet::single(Resource::Ore, 1),
                    ResourceSet::single(Resource::Sheep, 1),
                ),
            ],
            &ctx,
        );
        assert_eq!(aggregate_offers(rated, &ctx).len(), 2);
    }

    #[test]
    fn aggregation_output_keeps_sides_disjoint() {
        let mut fixture = Fixture::new();
        let rated = rated_pair(Resource::Wheat, Resource::Sheep, &mut fixture);
        let ctx = fixture.ctx();
        for candidate in aggregate_offers(rated, &ctx) {
            assert!(candidate.offer.sides_disjoint());
        }
    }

    #[test]
    fn aggregation_sorts_by_eta_then_global_eta() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx();
        let rated = rate_offers(
            vec![
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[1]),
                    ResourceSet::single(Resource::Sheep, 1),
                    ResourceSet::single(Resource::Wheat, 1), // eta 4
                ),
                TradeOffer::addressed(
                    PlayerId::new(0),
                    recipients(&[2]),
                    ResourceSet::single(Resource::Sheep, 1),
                    ResourceSet::single(Resource::Clay, 1), // eta 0
                ),
            ],
            &ctx,
        );
        let out = aggregate_offers(rated, &ctx);
        let etas: Vec<Eta> = out.iter().map(|candidate| candidate.eta).collect();
        let mut sorted = etas.clone();
        sorted.sort();
        assert_eq!(etas, sorted);
    }

    // -----------------------------------------------------------------------
    // Full pipeline
    // -----------------------------------------------------------------------

    #[test]
    fn full_pipeline_keeps_a_winning_candidate() {
        let mut fixture = Fixture::new().with_clay_seller();
        let ctx = fixture.ctx();
        let out = run(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        assert_eq!(out.len(), 1);
        assert_eq!(out.first().map(|candidate| candidate.eta), Some(Eta::ZERO));
    }

    #[test]
    fn pipeline_is_idempotent_on_its_own_output() {
        let mut fixture = Fixture::new().with_clay_seller();
        let ctx = fixture.ctx();
        let first = run(vec![sheep_for_clay(&recipients(&[1]))], &ctx);
        let offers: Vec<TradeOffer> = first
            .iter()
            .map(|candidate| candidate.offer.clone())
            .collect();
        let second = run(offers, &ctx);
        assert_eq!(first, second);
    }
}
