//! Offer and counteroffer synthesis, including completion of
//! underspecified offers.
//!
//! Proactive proposals run the catalog through the filtering pipeline and
//! take the best survivor that beats the bank baseline. Counteroffers
//! re-run the same search from the inverted perspective, restricted to
//! the original proposer. Partial and disjunctive incoming offers are
//! expanded against a fixed template catalog of small resource sets and
//! judged from both chairs before one completion is chosen.

use std::collections::BTreeSet;

use rand::Rng;

use parley_types::{Eta, PlayerId, RatedOffer, Resource, ResourceSet, TradeOffer};

use crate::catalog;
use crate::context::NegotiationContext;
use crate::estimator::EtaEvaluator;
use crate::oracle::{accept_trade, own_baseline, plausibly_holds, predict_response};
use crate::pipeline;
use crate::policy::CompletionStrategy;

// ---------------------------------------------------------------------------
// Proactive offers
// ---------------------------------------------------------------------------

/// Propose the best trade worth opening this turn, if any.
///
/// Returns `None` when the build plan is already affordable, when the
/// hand is inconsistent (unidentified cards in the agent's own holdings),
/// or when no candidate survives the pipeline and beats the baseline.
/// Equally-ranked best candidates are tie-broken through the seeded RNG.
pub fn make_offer<R: Rng>(
    ctx: &NegotiationContext<'_>,
    rng: &mut R,
) -> Option<TradeOffer> {
    let target = ctx.target();
    if ctx.resources.contains(&target) {
        return None;
    }
    if ctx.resources.contains_unknown() {
        tracing::warn!(
            seat = %ctx.seat,
            "own hand contains unidentified cards; refusing to propose"
        );
        return None;
    }

    let recipients: BTreeSet<PlayerId> = ctx
        .view
        .opponents_of(ctx.seat)
        .into_iter()
        .filter(|opponent| !ctx.beliefs.is_embargoed(*opponent))
        .collect();
    if recipients.is_empty() {
        return None;
    }

    let offers = catalog::legal_offers(ctx.resources, ctx.seat, &recipients, &ctx.policy.catalog);
    let ranked = pipeline::run(offers, ctx);

    let baseline = own_baseline(ctx);
    let winners: Vec<&RatedOffer> = ranked
        .iter()
        .filter(|candidate| accept_trade(candidate, &baseline, &ctx.policy.acceptance))
        .collect();

    pick_among_ties(&winners, rng).or_else(|| bankable_fallback(ctx, &recipients))
}

/// Choose uniformly among the candidates sharing the best rank.
fn pick_among_ties<R: Rng>(winners: &[&RatedOffer], rng: &mut R) -> Option<TradeOffer> {
    let best_key: (Eta, Eta) = winners.first()?.rank_key();
    let tied: Vec<&&RatedOffer> = winners
        .iter()
        .filter(|candidate| candidate.rank_key() == best_key)
        .collect();
    let index = if tied.len() > 1 {
        rng.random_range(0..tied.len())
    } else {
        0
    };
    tied.get(index).map(|candidate| candidate.offer.clone())
}

/// When nothing improves the plan ETA directly, try acquiring a type that
/// is useless to the plan but would complete a bank-rate stack.
fn bankable_fallback(
    ctx: &NegotiationContext<'_>,
    recipients: &BTreeSet<PlayerId>,
) -> Option<TradeOffer> {
    let target = ctx.target();
    let ports = ctx.own_ports();
    let spare = ctx.resources.subtract(&target);

    for get_type in Resource::KNOWN {
        if target.count(get_type) > 0 {
            continue;
        }
        // One more of this type reaches the bank rate.
        let held = ctx.resources.count(get_type);
        if held.saturating_add(1) < ports.ratio_for(get_type) {
            continue;
        }
        for give_type in Resource::KNOWN {
            if give_type == get_type || spare.count(give_type) == 0 {
                continue;
            }
            let offer = TradeOffer::addressed(
                ctx.seat,
                recipients.clone(),
                ResourceSet::single(give_type, 1),
                ResourceSet::single(get_type, 1),
            );
            let mut survivors =
                pipeline::filter_legal_recipients(pipeline::rate_offers(vec![offer], ctx), ctx);
            survivors = pipeline::filter_likely_recipients(survivors, ctx);
            if let Some(candidate) = survivors.into_iter().next() {
                return Some(candidate.offer);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Counteroffers
// ---------------------------------------------------------------------------

/// Synthesize a counter to a rejected incoming offer.
///
/// The incoming offer's give/get perspective is inverted and the proposal
/// search re-runs with the original proposer as sole recipient.
pub fn make_counter_offer<R: Rng>(
    incoming: &TradeOffer,
    ctx: &NegotiationContext<'_>,
    rng: &mut R,
) -> Option<TradeOffer> {
    if ctx.resources.contains_unknown() {
        tracing::warn!(
            seat = %ctx.seat,
            "own hand contains unidentified cards; refusing to counter"
        );
        return None;
    }

    let mut recipients = BTreeSet::new();
    recipients.insert(incoming.from);

    let offers = catalog::legal_offers(ctx.resources, ctx.seat, &recipients, &ctx.policy.catalog);
    let ranked = pipeline::run(offers, ctx);

    let baseline = own_baseline(ctx);
    let echo = incoming.inverted(ctx.seat);
    let winners: Vec<&RatedOffer> = ranked
        .iter()
        .filter(|candidate| accept_trade(candidate, &baseline, &ctx.policy.acceptance))
        .filter(|candidate| !candidate.offer.same_exchange(&echo))
        .collect();

    pick_among_ties(&winners, rng)
}

// ---------------------------------------------------------------------------
// Completion of partial/disjunctive offers
// ---------------------------------------------------------------------------

/// A fully-specified candidate completion, judged from both chairs.
struct CompletionCandidate {
    /// The completed exchange from this agent's perspective.
    ours: TradeOffer,
    /// Our turns-to-target after the trade.
    own_eta: Eta,
    /// The proposer's estimated turns-to-target after the trade.
    their_eta: Eta,
    /// Whether our own acceptance rule takes the trade.
    own_accepts: bool,
    /// Whether the proposer is predicted to take it.
    they_accept: bool,
}

/// Complete a partial or disjunctive incoming offer.
///
/// Every underspecified side is expanded -- disjunctive sides into their
/// single-resource alternatives, empty sides into the fixed template
/// catalog -- and each fully-specified candidate must keep its sides
/// disjoint, be affordable for this agent, stay plausible for the
/// proposer, and not repeat the offer log. Survivors are partitioned into
/// "I would accept", "the proposer should accept", and their
/// intersection; the policy strategy picks one, falling back across the
/// lists in a fixed order.
///
/// The returned offer is expressed from this agent's perspective,
/// addressed to the original proposer.
pub fn complete_offer(
    incoming: &TradeOffer,
    ctx: &NegotiationContext<'_>,
) -> Option<TradeOffer> {
    if !incoming.is_partial() && !incoming.is_disjunctive() {
        return None;
    }

    let give_options = side_options(&incoming.give, incoming.give_is_disjunctive);
    let get_options = side_options(&incoming.get, incoming.get_is_disjunctive);

    let mut candidates: Vec<CompletionCandidate> = Vec::new();
    for give in &give_options {
        for get in &get_options {
            if let Some(candidate) = judge_completion(incoming, give, get, ctx) {
                candidates.push(candidate);
            }
        }
    }
    if candidates.is_empty() {
        return None;
    }

    select_completion(&candidates, ctx)
}

/// The expansion of one offer side: the side itself when fully
/// specified, its alternatives when disjunctive, the template catalog
/// when empty.
fn side_options(side: &ResourceSet, disjunctive: bool) -> Vec<ResourceSet> {
    if disjunctive {
        return side
            .iter()
            .map(|(resource, count)| ResourceSet::single(resource, count))
            .collect();
    }
    if side.is_empty() {
        return completion_templates();
    }
    vec![side.clone()]
}

/// The fixed catalog of small resource-set templates: every single
/// resource at one and two units, and every disjoint two-resource pair.
fn completion_templates() -> Vec<ResourceSet> {
    let mut templates = Vec::new();
    for resource in Resource::KNOWN {
        templates.push(ResourceSet::single(resource, 1));
        templates.push(ResourceSet::single(resource, 2));
    }
    for (index, first) in Resource::KNOWN.iter().enumerate() {
        for second in Resource::KNOWN.iter().skip(index.saturating_add(1)) {
            templates.push(
                [(*first, 1_u32), (*second, 1_u32)].into_iter().collect(),
            );
        }
    }
    templates
}

/// Validate one completed candidate and judge it from both chairs.
fn judge_completion(
    incoming: &TradeOffer,
    give: &ResourceSet,
    get: &ResourceSet,
    ctx: &NegotiationContext<'_>,
) -> Option<CompletionCandidate> {
    if give.is_empty() || get.is_empty() || !give.disjoint(get) {
        return None;
    }

    // The completed offer, still from the proposer's perspective.
    let mut completed = incoming.clone();
    completed.give = give.clone();
    completed.get = get.clone();
    completed.give_is_disjunctive = false;
    completed.get_is_disjunctive = false;

    // We pay the proposer's get side.
    if !ctx.resources.contains(&completed.get) {
        return None;
    }
    let proposer = completed.from;
    let believed = ctx.beliefs.believed_resources(proposer);
    if !plausibly_holds(&believed, &completed.give, ctx.policy.acceptance.plausibility) {
        return None;
    }

    let ours = completed.inverted(ctx.seat);
    if ctx.beliefs.was_offered(&ours) {
        return None;
    }

    let own_eta = ctx.eta_after(&ours.give, &ours.get);
    let own_candidate = RatedOffer::new(
        ours.clone(),
        own_eta,
        ctx.global_eta_after(&ours.give, &ours.get),
    );
    let own_accepts = accept_trade(&own_candidate, &own_baseline(ctx), &ctx.policy.acceptance);

    let they_accept = predict_response(&ours, proposer, ctx);
    let their_target = ctx.beliefs.predicted_plan(proposer).full_target();
    let their_eta = EtaEvaluator::new(ctx.estimator).eta(
        &believed,
        &their_target,
        &completed.give,
        &completed.get,
        &ctx.view.port_flags(proposer),
    );

    Some(CompletionCandidate {
        ours,
        own_eta,
        their_eta,
        own_accepts,
        they_accept,
    })
}

/// Apply the policy strategy with the fixed fallback order:
/// intersection, then our own list, then the proposer's.
fn select_completion(
    candidates: &[CompletionCandidate],
    ctx: &NegotiationContext<'_>,
) -> Option<TradeOffer> {
    let strategy = ctx.policy.completion.strategy;

    let pick_intersection = || {
        candidates
            .iter()
            .filter(|candidate| candidate.own_accepts && candidate.they_accept)
            .min_by_key(|candidate| candidate.own_eta)
    };
    let pick_own_best = || {
        candidates
            .iter()
            .filter(|candidate| candidate.own_accepts)
            .min_by_key(|candidate| candidate.own_eta)
    };
    let pick_opponent_worst = || {
        candidates
            .iter()
            .filter(|candidate| candidate.they_accept)
            .max_by_key(|candidate| candidate.their_eta)
    };

    let primary = match strategy {
        CompletionStrategy::OwnBest => pick_own_best(),
        CompletionStrategy::OpponentWorst => pick_opponent_worst(),
        CompletionStrategy::Intersection | CompletionStrategy::IntersectionFirst => {
            pick_intersection()
        }
    };
    let chosen = primary
        .or_else(pick_intersection)
        .or_else(pick_own_best)
        .or_else(pick_opponent_worst)?;

    // A candidate surfaced by the proposer-side list carries an ETA from
    // the proposer's perspective; restate our own before emitting.
    if !chosen.own_accepts && chosen.they_accept {
        let recomputed = ctx.eta_after(&chosen.ours.give, &chosen.ours.get);
        tracing::debug!(
            eta = %recomputed,
            "completion chosen from the proposer's list; own estimate restated"
        );
    }

    Some(chosen.ours.clone())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
