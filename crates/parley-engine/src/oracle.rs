//! Trade acceptance oracle.
//!
//! One core rule decides every accept/reject question in the engine:
//! a candidate trade is measured against the best bank/port alternative
//! (the baseline), and must beat it by the policy-configured margin. The
//! rule runs in two modes -- as the responder judging an incoming offer,
//! and as a predictor guessing an opponent's answer to one of our own
//! candidates -- differing only in whose resources, ports, and build plan
//! feed the estimate.
//!
//! Implausible offers are rejected before any estimation: if the
//! responder cannot possibly pay the requested side, there is nothing to
//! evaluate.

use rust_decimal::Decimal;

use parley_types::{
    BuildPlan, Eta, PlayerId, RatedOffer, Resource, ResourceSet, TradeOffer, TradeVerdict,
};

use crate::batna::resolve_batna;
use crate::context::NegotiationContext;
use crate::estimator::EtaEvaluator;
use crate::policy::{AcceptancePolicy, PlausibilityMode};

// ---------------------------------------------------------------------------
// Plausibility
// ---------------------------------------------------------------------------

/// Whether `holdings` can plausibly cover `required`.
///
/// Pessimistic mode counts only positively identified cards. Optimistic
/// mode lets unidentified cards stand in for any type: the sum of
/// per-type deficits must fit within the unknown count.
pub fn plausibly_holds(
    holdings: &ResourceSet,
    required: &ResourceSet,
    mode: PlausibilityMode,
) -> bool {
    match mode {
        PlausibilityMode::Pessimistic => holdings.contains(required),
        PlausibilityMode::Optimistic => {
            let unknown_budget = holdings.count(Resource::Unknown);
            let deficit = required
                .iter()
                .fold(0_u32, |acc, (resource, wanted)| {
                    acc.saturating_add(wanted.saturating_sub(holdings.count(resource)))
                });
            deficit <= unknown_budget
        }
    }
}

// ---------------------------------------------------------------------------
// Core acceptance rule
// ---------------------------------------------------------------------------

/// The shared accept/reject rule over a rated candidate and baseline.
///
/// - Slower than the baseline: reject.
/// - Tied with the baseline: accept only an immediate build whose
///   give-cost does not exceed the baseline's.
/// - Strictly faster: require the policy's minimum absolute improvement
///   and, when configured, the minimum improvement ratio.
///
/// The tied-ETA condition is preserved verbatim from the original
/// negotiation rules; its asymmetry is pending product-owner review.
pub fn accept_trade(
    candidate: &RatedOffer,
    baseline: &RatedOffer,
    policy: &AcceptancePolicy,
) -> bool {
    if candidate.eta > baseline.eta {
        return false;
    }
    if candidate.eta == baseline.eta {
        return candidate.eta.is_immediate()
            && candidate.offer.give.total() <= baseline.offer.give.total();
    }

    let improvement = candidate.eta.improvement_over(baseline.eta);
    if improvement < policy.min_improvement_turns {
        return false;
    }
    match policy.min_improvement_ratio {
        None => true,
        Some(ratio) => {
            let required = ratio
                .checked_mul(Decimal::from(baseline.eta.turns()))
                .unwrap_or(Decimal::MAX);
            Decimal::from(improvement) >= required
        }
    }
}

// ---------------------------------------------------------------------------
// Baselines
// ---------------------------------------------------------------------------

/// The acting player's baseline: the rated BATNA, or standing pat.
///
/// When no improving bank trade exists the baseline is the do-nothing
/// alternative (empty give and get at the current ETA), so the core rule
/// still rejects trades that improve nothing.
pub fn own_baseline(ctx: &NegotiationContext<'_>) -> RatedOffer {
    let target = ctx.target();
    resolve_batna(
        ctx.seat,
        &target,
        ctx.resources,
        &ctx.own_ports(),
        ctx.estimator,
    )
    .map_or_else(
        || {
            RatedOffer::new(
                TradeOffer::bank(ctx.seat, ResourceSet::new(), ResourceSet::new()),
                ctx.current_eta(),
                ctx.global_eta_after(&ResourceSet::new(), &ResourceSet::new()),
            )
        },
        |offer| {
            let eta = ctx.eta_after(&offer.give, &offer.get);
            let global_eta = ctx.global_eta_after(&offer.give, &offer.get);
            RatedOffer::new(offer, eta, global_eta)
        },
    )
}

/// A player's baseline computed from a hypothetical perspective:
/// believed holdings, predicted plan target, and their own ports.
fn perspective_baseline(
    player: PlayerId,
    holdings: &ResourceSet,
    target: &ResourceSet,
    ctx: &NegotiationContext<'_>,
) -> RatedOffer {
    let ports = ctx.view.port_flags(player);
    let evaluator = EtaEvaluator::new(ctx.estimator);
    let none = ResourceSet::new();
    resolve_batna(player, target, holdings, &ports, ctx.estimator).map_or_else(
        || {
            RatedOffer::new(
                TradeOffer::bank(player, ResourceSet::new(), ResourceSet::new()),
                evaluator.eta(holdings, target, &none, &none, &ports),
                evaluator.eta(holdings, &BuildPlan::global_target(), &none, &none, &ports),
            )
        },
        |offer| {
            let eta = evaluator.eta(holdings, target, &offer.give, &offer.get, &ports);
            let global_eta = evaluator.eta(
                holdings,
                &BuildPlan::global_target(),
                &offer.give,
                &offer.get,
                &ports,
            );
            RatedOffer::new(offer, eta, global_eta)
        },
    )
}

/// A player's estimated turns-to-win, from believed holdings.
fn win_eta(player: PlayerId, holdings: &ResourceSet, ctx: &NegotiationContext<'_>) -> Eta {
    let none = ResourceSet::new();
    EtaEvaluator::new(ctx.estimator).eta(
        holdings,
        &BuildPlan::global_target(),
        &none,
        &none,
        &ctx.view.port_flags(player),
    )
}

// ---------------------------------------------------------------------------
// Responder mode
// ---------------------------------------------------------------------------

/// Decide an incoming, fully-specified offer from the responder's chair.
///
/// Implausible offers are rejected without estimation. Offers from a
/// near-winning or directly-contesting proposer are rejected outright.
/// Otherwise the core rule runs against the responder's own baseline; a
/// plausible offer that merely loses on the rule yields
/// [`TradeVerdict::Counter`] so the engine can renegotiate.
pub fn decide(offer: &TradeOffer, ctx: &NegotiationContext<'_>) -> TradeVerdict {
    // The responder pays the offer's get side.
    if !plausibly_holds(ctx.resources, &offer.get, ctx.policy.acceptance.plausibility) {
        return TradeVerdict::Reject;
    }

    // Never help a near-winning or directly-contesting opponent.
    let proposer = offer.from;
    let believed = ctx.beliefs.believed_resources(proposer);
    if win_eta(proposer, &believed, ctx) < Eta::new(ctx.policy.acceptance.race_win_eta) {
        return TradeVerdict::Reject;
    }
    if ctx.view.are_contesting(proposer, ctx.seat) {
        return TradeVerdict::Reject;
    }

    let from_our_side = offer.inverted(ctx.seat);
    let candidate = RatedOffer::new(
        from_our_side.clone(),
        ctx.eta_after(&from_our_side.give, &from_our_side.get),
        ctx.global_eta_after(&from_our_side.give, &from_our_side.get),
    );
    let baseline = own_baseline(ctx);

    if accept_trade(&candidate, &baseline, &ctx.policy.acceptance) {
        TradeVerdict::Accept
    } else {
        TradeVerdict::Counter
    }
}

// ---------------------------------------------------------------------------
// Prediction mode
// ---------------------------------------------------------------------------

/// Predict whether `opponent` would accept one of our candidate offers.
///
/// The same rule as [`decide`], run from the opponent's hypothetical
/// perspective: believed (not known) holdings, the predicted build plan,
/// and the opponent's ports. The board estimator stands in for the
/// opponent's own production profile.
pub fn predict_response(
    offer: &TradeOffer,
    opponent: PlayerId,
    ctx: &NegotiationContext<'_>,
) -> bool {
    let believed = ctx.beliefs.believed_resources(opponent);

    // The opponent pays the offer's get side.
    if !plausibly_holds(&believed, &offer.get, ctx.policy.acceptance.plausibility) {
        return false;
    }

    // They will not help us if we are about to win, or if we contest them.
    let our_win = win_eta(ctx.seat, ctx.resources, ctx);
    if our_win < Eta::new(ctx.policy.acceptance.race_win_eta) {
        return false;
    }
    if ctx.view.are_contesting(opponent, ctx.seat) {
        return false;
    }

    let plan_target = ctx.beliefs.predicted_plan(opponent).full_target();
    let their_ports = ctx.view.port_flags(opponent);
    let evaluator = EtaEvaluator::new(ctx.estimator);

    let their_side = offer.inverted(opponent);
    let candidate = RatedOffer::new(
        their_side.clone(),
        evaluator.eta(
            &believed,
            &plan_target,
            &their_side.give,
            &their_side.get,
            &their_ports,
        ),
        evaluator.eta(
            &believed,
            &BuildPlan::global_target(),
            &their_side.give,
            &their_side.get,
            &their_ports,
        ),
    );
    let baseline = perspective_baseline(opponent, &believed, &plan_target, ctx);

    accept_trade(&candidate, &baseline, &ctx.policy.acceptance)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use parley_types::{BuildPlan, GameView, Piece, PlayerId, Resource};

    use crate::belief::{BeliefStore, InMemoryBeliefStore};
    use crate::estimator::TableEstimator;
    use crate::policy::NegotiationPolicy;

    use super::*;

    fn set(pairs: &[(Resource, u32)]) -> ResourceSet {
        pairs.iter().copied().collect()
    }

    fn rated(give_total: u32, eta: u32) -> RatedOffer {
        RatedOffer::new(
            TradeOffer::bank(
                PlayerId::new(0),
                ResourceSet::single(Resource::Sheep, give_total),
                ResourceSet::single(Resource::Clay, 1),
            ),
            Eta::new(eta),
            Eta::new(eta),
        )
    }

    // -----------------------------------------------------------------------
    // Core rule
    // -----------------------------------------------------------------------

    #[test]
    fn slower_than_baseline_is_rejected() {
        let policy = AcceptancePolicy::default();
        assert!(!accept_trade(&rated(1, 5), &rated(4, 4), &policy));
    }

    #[test]
    fn strictly_better_is_accepted_with_default_margin() {
        let policy = AcceptancePolicy::default();
        assert!(accept_trade(&rated(1, 0), &rated(4, 4), &policy));
        assert!(accept_trade(&rated(1, 3), &rated(4, 4), &policy));
    }

    #[test]
    fn nonzero_tie_is_rejected() {
        let policy = AcceptancePolicy::default();
        // Equal ETAs at 4 turns: not an immediate build, so no deal.
        assert!(!accept_trade(&rated(1, 4), &rated(4, 4), &policy));
    }

    #[test]
    fn immediate_tie_accepted_only_at_lower_give_cost() {
        let policy = AcceptancePolicy::default();
        assert!(accept_trade(&rated(1, 0), &rated(4, 0), &policy));
        assert!(!accept_trade(&rated(4, 0), &rated(1, 0), &policy));
    }

    #[test]
    fn minimum_improvement_margin_applies() {
        let policy = AcceptancePolicy {
            min_improvement_turns: 3,
            ..AcceptancePolicy::default()
        };
        assert!(!accept_trade(&rated(1, 3), &rated(4, 4), &policy));
        assert!(accept_trade(&rated(1, 1), &rated(4, 4), &policy));
    }

    #[test]
    fn improvement_ratio_applies_when_configured() {
        let policy = AcceptancePolicy {
            min_improvement_ratio: Some(Decimal::new(5, 1)), // half the baseline
            ..AcceptancePolicy::default()
        };
        // 4 -> 3 is a 25% improvement: rejected.
        assert!(!accept_trade(&rated(1, 3), &rated(4, 4), &policy));
        // 4 -> 1 is a 75% improvement: accepted.
        assert!(accept_trade(&rated(1, 1), &rated(4, 4), &policy));
    }

    // -----------------------------------------------------------------------
    // Plausibility
    // -----------------------------------------------------------------------

    #[test]
    fn pessimistic_counts_only_known_cards() {
        let holdings = set(&[(Resource::Wood, 1), (Resource::Unknown, 5)]);
        let required = set(&[(Resource::Wood, 2)]);
        assert!(!plausibly_holds(
            &holdings,
            &required,
            PlausibilityMode::Pessimistic
        ));
    }

    #[test]
    fn optimistic_spends_unknowns_on_deficits() {
        let holdings = set(&[(Resource::Wood, 1), (Resource::Unknown, 2)]);
        assert!(plausibly_holds(
            &holdings,
            &set(&[(Resource::Wood, 2), (Resource::Ore, 1)]),
            PlausibilityMode::Optimistic
        ));
        // Three missing cards, two unknowns: implausible even optimistically.
        assert!(!plausibly_holds(
            &holdings,
            &set(&[(Resource::Wood, 2), (Resource::Ore, 2)]),
            PlausibilityMode::Optimistic
        ));
    }

    // -----------------------------------------------------------------------
    // Responder mode
    // -----------------------------------------------------------------------

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
                // One road away, short a clay; sheep to spare.
                resources: set(&[(Resource::Wood, 1), (Resource::Sheep, 4)]),
                plan: BuildPlan::new(vec![Piece::Road]),
                view,
                policy: NegotiationPolicy::default(),
                estimator: TableEstimator::new(&[
                    (Resource::Clay, Decimal::new(25, 2)),
                    (Resource::Ore, Decimal::new(25, 2)),
                    (Resource::Sheep, Decimal::ONE),
                    (Resource::Wheat, Decimal::ONE),
                    (Resource::Wood, Decimal::new(5, 1)),
                ]),
                beliefs: InMemoryBeliefStore::new(),
            }
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

    #[test]
    fn accepts_an_immediate_build_beating_the_batna() {
        let mut fixture = Fixture::new();
        // Opponent gives the missing clay for one spare sheep.
        let offer = TradeOffer::to_one(
            PlayerId::new(1),
            PlayerId::new(0),
            ResourceSet::single(Resource::Clay, 1),
            ResourceSet::single(Resource::Sheep, 1),
        );
        let ctx = fixture.ctx();
        assert_eq!(decide(&offer, &ctx), TradeVerdict::Accept);
    }

    #[test]
    fn rejects_when_the_requested_side_is_unaffordable() {
        let mut fixture = Fixture::new();
        let offer = TradeOffer::to_one(
            PlayerId::new(1),
            PlayerId::new(0),
            ResourceSet::single(Resource::Clay, 1),
            ResourceSet::single(Resource::Ore, 2), // no ore held
        );
        let ctx = fixture.ctx();
        assert_eq!(decide(&offer, &ctx), TradeVerdict::Reject);
    }

    #[test]
    fn counters_a_plausible_but_losing_offer() {
        let mut fixture = Fixture::new();
        // Asks for the wood the plan needs; the trade slows us down.
        let offer = TradeOffer::to_one(
            PlayerId::new(1),
            PlayerId::new(0),
            ResourceSet::single(Resource::Wheat, 1),
            ResourceSet::single(Resource::Wood, 1),
        );
        let ctx = fixture.ctx();
        assert_eq!(decide(&offer, &ctx), TradeVerdict::Counter);
    }

    #[test]
    fn rejects_a_near_winning_proposer() {
        let mut fixture = Fixture::new();
        // The proposer is believed to hold nearly everything: their
        // turns-to-win collapse below the race threshold.
        fixture.beliefs.set_believed_resources(
            PlayerId::new(1),
            set(&[
                (Resource::Clay, 2),
                (Resource::Ore, 4),
                (Resource::Sheep, 2),
                (Resource::Wheat, 4),
                (Resource::Wood, 2),
            ]),
        );
        let offer = TradeOffer::to_one(
            PlayerId::new(1),
            PlayerId::new(0),
            ResourceSet::single(Resource::Clay, 1),
            ResourceSet::single(Resource::Sheep, 1),
        );
        let ctx = fixture.ctx();
        assert_eq!(decide(&offer, &ctx), TradeVerdict::Reject);
    }

    #[test]
    fn rejects_a_contesting_proposer() {
        let mut fixture = Fixture::new();
        fixture
            .view
            .contested
            .insert((PlayerId::new(0), PlayerId::new(1)));
        let offer = TradeOffer::to_one(
            PlayerId::new(1),
            PlayerId::new(0),
            ResourceSet::single(Resource::Clay, 1),
            ResourceSet::single(Resource::Sheep, 1),
        );
        let ctx = fixture.ctx();
        assert_eq!(decide(&offer, &ctx), TradeVerdict::Reject);
    }

    #[test]
    fn accepted_candidates_dominate_the_baseline() {
        let mut fixture = Fixture::new();
        let offer = TradeOffer::to_one(
            PlayerId::new(1),
            PlayerId::new(0),
            ResourceSet::single(Resource::Clay, 1),
            ResourceSet::single(Resource::Sheep, 1),
        );
        let ctx = fixture.ctx();
        let verdict = decide(&offer, &ctx);
        if verdict == TradeVerdict::Accept {
            let ours = offer.inverted(PlayerId::new(0));
            let candidate_eta = ctx.eta_after(&ours.give, &ours.get);
            assert!(candidate_eta <= own_baseline(&ctx).eta);
        }
    }

    // -----------------------------------------------------------------------
    // Prediction mode
    // -----------------------------------------------------------------------

    #[test]
    fn predicts_acceptance_from_believed_resources() {
        let mut fixture = Fixture::new();
        let opponent = PlayerId::new(2);
        // The opponent wants a settlement and lacks only wheat, which we
        // offer for one of their spare ore.
        fixture.beliefs.set_predicted_plan(
            opponent,
            BuildPlan::new(vec![Piece::Settlement]),
        );
        fixture.beliefs.set_believed_resources(
            opponent,
            set(&[
                (Resource::Clay, 1),
                (Resource::Wood, 1),
                (Resource::Sheep, 1),
                (Resource::Ore, 2),
            ]),
        );
        let offer = TradeOffer::to_one(
            PlayerId::new(0),
            opponent,
            ResourceSet::single(Resource::Wheat, 1),
            ResourceSet::single(Resource::Ore, 1),
        );
        let ctx = fixture.ctx();
        assert!(predict_response(&offer, opponent, &ctx));
    }

    #[test]
    fn prediction_fails_on_implausible_holdings() {
        let mut fixture = Fixture::new();
        let opponent = PlayerId::new(2);
        fixture
            .beliefs
            .set_believed_resources(opponent, ResourceSet::new());
        let offer = TradeOffer::to_one(
            PlayerId::new(0),
            opponent,
            ResourceSet::single(Resource::Wheat, 1),
            ResourceSet::single(Resource::Ore, 1),
        );
        let ctx = fixture.ctx();
        assert!(!predict_response(&offer, opponent, &ctx));
    }
}
