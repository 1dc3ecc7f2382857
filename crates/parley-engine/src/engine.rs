//! Top-level negotiation engine facade.
//!
//! [`NegotiationEngine`] owns the immutable policy and the seeded
//! tie-break RNG, and wires the control flow between the components: an
//! incoming offer runs sanctions, then the acceptance oracle, then
//! counteroffer synthesis; underspecified offers route to completion; a
//! "time to negotiate" trigger runs the catalog and pipeline. Every
//! emitted offer is recorded in the offer log so the history filters see
//! it on later turns.

use rand::SeedableRng;
use rand::rngs::StdRng;

use parley_types::{OfferResponse, PlayerId, TradeOffer, TradeVerdict};

use crate::context::NegotiationContext;
use crate::oracle;
use crate::persuasion;
use crate::policy::NegotiationPolicy;
use crate::sanctions;
use crate::synthesizer;

// ---------------------------------------------------------------------------
// TurnEvents
// ---------------------------------------------------------------------------

/// Sanction changes produced by turn upkeep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnEvents {
    /// Players whose embargoes aged out this turn.
    pub lifted_embargoes: Vec<PlayerId>,
    /// Whether the resource block aged out this turn.
    pub block_lifted: bool,
    /// A new embargo proposed against this player, if any.
    pub embargo_proposal: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// NegotiationEngine
// ---------------------------------------------------------------------------

/// The agent's negotiation decision engine.
///
/// One engine instance serves one agent for a whole game. Decisions are
/// synchronous and computed to completion; the belief store passed in
/// each context is the only state the engine mutates.
pub struct NegotiationEngine {
    policy: NegotiationPolicy,
    rng: StdRng,
}

impl NegotiationEngine {
    /// Create an engine with the given policy; the tie-break RNG is
    /// seeded from `policy.seed` so decision sequences are reproducible.
    pub fn new(policy: NegotiationPolicy) -> Self {
        let rng = StdRng::seed_from_u64(policy.seed);
        Self { policy, rng }
    }

    /// The engine's immutable policy.
    pub const fn policy(&self) -> &NegotiationPolicy {
        &self.policy
    }

    /// Turn upkeep: expire sanctions, then consider a new embargo.
    pub fn begin_turn(&mut self, ctx: &mut NegotiationContext<'_>) -> TurnEvents {
        let lifted_embargoes = sanctions::expire_embargoes(ctx);
        let block_lifted = sanctions::expire_blocks(ctx);

        let embargo_proposal = ctx
            .view
            .opponents_of(ctx.seat)
            .into_iter()
            .find(|opponent| sanctions::should_embargo(*opponent, ctx));
        if let Some(target) = embargo_proposal {
            sanctions::propose_embargo(target, ctx);
        }

        TurnEvents {
            lifted_embargoes,
            block_lifted,
            embargo_proposal,
        }
    }

    /// Answer one incoming trade offer.
    pub fn respond(
        &mut self,
        offer: &TradeOffer,
        ctx: &mut NegotiationContext<'_>,
    ) -> OfferResponse {
        // Sanctions first: no estimation for refused counterparties.
        if ctx.beliefs.is_embargoed(offer.from) {
            return OfferResponse::Reject;
        }
        if sanctions::should_block_offer(offer, ctx) {
            sanctions::engage_block(offer, ctx);
            return OfferResponse::Reject;
        }

        if offer.is_partial() || offer.is_disjunctive() {
            return match synthesizer::complete_offer(offer, ctx) {
                Some(completed) => {
                    ctx.beliefs.record_offer(completed.clone());
                    OfferResponse::Complete(completed)
                }
                None => OfferResponse::Reject,
            };
        }

        match oracle::decide(offer, ctx) {
            TradeVerdict::Accept => OfferResponse::Accept,
            TradeVerdict::Reject => OfferResponse::Reject,
            TradeVerdict::Counter => {
                match synthesizer::make_counter_offer(offer, ctx, &mut self.rng) {
                    Some(counter) => {
                        ctx.beliefs.record_offer(counter.clone());
                        OfferResponse::Counter(counter)
                    }
                    None => OfferResponse::Reject,
                }
            }
        }
    }

    /// Proactively propose a trade, if one is worth opening.
    pub fn propose(&mut self, ctx: &mut NegotiationContext<'_>) -> Option<TradeOffer> {
        let offer = synthesizer::make_offer(ctx, &mut self.rng)?;
        ctx.beliefs.record_offer(offer.clone());
        Some(offer)
    }

    /// Decide whether to declare `offer` binding, spending the force
    /// budget on success.
    pub fn should_force(
        &mut self,
        offer: &TradeOffer,
        ctx: &mut NegotiationContext<'_>,
        prior_rejections: u32,
    ) -> bool {
        if persuasion::should_force(offer, ctx, prior_rejections) {
            ctx.beliefs.spend_force_budget();
            true
        } else {
            false
        }
    }

    /// Comply with an embargo proposed by another player.
    pub fn embargo_proposed(
        &mut self,
        target: PlayerId,
        ctx: &mut NegotiationContext<'_>,
    ) {
        sanctions::embargo_proposed(target, ctx);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
