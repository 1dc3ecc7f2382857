//! Force-accept (persuasion) engine.
//!
//! Declaring a trade binding without the counterparty's consent is the
//! strongest move in the negotiation repertoire, so it sits behind a
//! fixed, ordered chain of gates. Each gate is an independent predicate
//! over the offer, the believed state, and the policy; the combinator in
//! [`should_force`] is explicit about how they compose:
//!
//! 1. A recipient must plausibly be able to pay (always required -- a
//!    binding trade the recipient cannot pay is void).
//! 2. Each enabled gate must pass, unless the "any miscellaneous
//!    qualifying move" override is enabled and some recipient gains a
//!    capability from the trade.
//! 3. The force budget and the leader-score floor apply regardless.
//!
//! With no gate configured, the chain defaults to permitting the force.

use parley_types::{Piece, PortFlags, Resource, ResourceSet, TradeOffer};

use crate::context::NegotiationContext;
use crate::oracle::plausibly_holds;

// ---------------------------------------------------------------------------
// Capability predicates
// ---------------------------------------------------------------------------

/// Whether some piece is affordable from these resources right now.
pub fn can_build_any(resources: &ResourceSet, _ports: &PortFlags) -> bool {
    Piece::ALL
        .iter()
        .any(|piece| resources.contains(&piece.cost()))
}

/// Whether any bank/port trade is affordable from these resources.
pub fn can_bank_trade(resources: &ResourceSet, ports: &PortFlags) -> bool {
    Resource::KNOWN
        .iter()
        .any(|resource| resources.count(*resource) >= ports.ratio_for(*resource))
}

/// Whether some bank/port trade leaves a build exactly one resource away.
pub fn can_bank_into_near_build(resources: &ResourceSet, ports: &PortFlags) -> bool {
    for give_type in Resource::KNOWN {
        let ratio = ports.ratio_for(give_type);
        if resources.count(give_type) < ratio {
            continue;
        }
        for get_type in Resource::KNOWN {
            if get_type == give_type {
                continue;
            }
            let after = resources
                .subtract(&ResourceSet::single(give_type, ratio))
                .add(&ResourceSet::single(get_type, 1));
            let one_short = Piece::ALL
                .iter()
                .any(|piece| piece.cost().subtract(&after).total() == 1);
            if one_short {
                return true;
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

/// Gate: the offer was already rejected at least once.
pub const fn prior_rejection_gate(prior_rejections: u32) -> bool {
    prior_rejections > 0
}

/// Gate: the trade yields the proposer an immediate build.
pub fn immediate_build_gate(offer: &TradeOffer, ctx: &NegotiationContext<'_>) -> bool {
    ctx.eta_after(&offer.give, &offer.get).is_immediate()
}

/// Gate: some recipient gains a capability from the trade.
///
/// `capability` is judged on the recipient's believed hand before and
/// after the hypothetical exchange; with `require_not_before` the
/// capability must be new, not merely present.
pub fn recipient_gains_gate(
    offer: &TradeOffer,
    ctx: &NegotiationContext<'_>,
    capability: fn(&ResourceSet, &PortFlags) -> bool,
    require_not_before: bool,
) -> bool {
    offer.to.iter().any(|recipient| {
        let before = ctx.beliefs.believed_resources(*recipient);
        let after = before.subtract(&offer.get).add(&offer.give);
        let ports = ctx.view.port_flags(*recipient);
        capability(&after, &ports) && (!require_not_before || !capability(&before, &ports))
    })
}

/// Whether any recipient gains any of the miscellaneous capabilities.
fn any_qualifying_move(offer: &TradeOffer, ctx: &NegotiationContext<'_>) -> bool {
    recipient_gains_gate(offer, ctx, can_build_any, true)
        || recipient_gains_gate(offer, ctx, can_bank_trade, true)
        || recipient_gains_gate(offer, ctx, can_bank_into_near_build, true)
}

// ---------------------------------------------------------------------------
// Combinator
// ---------------------------------------------------------------------------

/// Decide whether to declare `offer` binding.
///
/// See the module documentation for the composition rules. Returns
/// `false` as soon as an enabled gate fails without the override; the
/// budget and leader-score checks run last and are never waived.
pub fn should_force(
    offer: &TradeOffer,
    ctx: &NegotiationContext<'_>,
    prior_rejections: u32,
) -> bool {
    let policy = &ctx.policy.persuasion;

    // A recipient must plausibly be able to pay the requested side.
    let payable = offer.to.iter().any(|recipient| {
        plausibly_holds(
            &ctx.beliefs.believed_resources(*recipient),
            &offer.get,
            ctx.policy.acceptance.plausibility,
        )
    });
    if !payable {
        return false;
    }

    let override_active =
        policy.allow_any_qualifying_move && any_qualifying_move(offer, ctx);

    let gates: [(bool, bool); 5] = [
        (
            policy.require_prior_rejection,
            prior_rejection_gate(prior_rejections),
        ),
        (
            policy.require_immediate_build,
            immediate_build_gate(offer, ctx),
        ),
        (
            policy.require_recipient_build,
            recipient_gains_gate(
                offer,
                ctx,
                can_build_any,
                policy.recipient_build_not_before,
            ),
        ),
        (
            policy.require_recipient_bank_trade,
            recipient_gains_gate(
                offer,
                ctx,
                can_bank_trade,
                policy.recipient_bank_trade_not_before,
            ),
        ),
        (
            policy.require_recipient_bank_then_build,
            recipient_gains_gate(
                offer,
                ctx,
                can_bank_into_near_build,
                policy.recipient_bank_then_build_not_before,
            ),
        ),
    ];
    for (enabled, passed) in gates {
        if enabled && !passed && !override_active {
            return false;
        }
    }

    // Mandatory regardless of the chain above.
    if ctx.beliefs.force_budget() == 0 {
        return false;
    }
    ctx.view.leader_score() >= policy.min_leader_score
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
