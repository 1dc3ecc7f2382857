//! Social sanctions: embargoes and resource blocks.
//!
//! Both sanctions are turn-scoped policies over state the memory
//! collaborator owns: the engine reads and updates embargo flags, the
//! blocked-resource set, start-turn markers, and budgets, but stores
//! none of it itself.
//!
//! An embargo is aimed at a runaway leader -- stop trading with them
//! until they fall behind or the embargo ages out. A block refuses
//! incoming offers for specific resource types, typically to starve the
//! table during the endgame.

use parley_types::{PlayerId, TradeOffer};

use crate::context::NegotiationContext;
use crate::persuasion::can_build_any;

// ---------------------------------------------------------------------------
// Embargo
// ---------------------------------------------------------------------------

/// Whether to propose an embargo against `player` this turn.
///
/// Requires: the player's public score at the policy threshold, the
/// current leader no further ahead than the player, fewer active
/// embargoes than the policy allows, and remaining propose budget.
pub fn should_embargo(player: PlayerId, ctx: &NegotiationContext<'_>) -> bool {
    if player == ctx.seat || ctx.beliefs.is_embargoed(player) {
        return false;
    }
    let policy = &ctx.policy.embargo;
    let score = ctx.view.score(player);
    score >= policy.score_threshold
        && ctx.view.leader_score() <= score
        && ctx.beliefs.active_embargoes().len() < policy.max_active
        && ctx.beliefs.embargo_budget() > 0
}

/// Propose an embargo: mark the player embargoed and spend one proposal.
pub fn propose_embargo(player: PlayerId, ctx: &mut NegotiationContext<'_>) {
    let turn = ctx.view.turn;
    ctx.beliefs.set_embargo(player, turn);
    ctx.beliefs.spend_embargo_budget();
    tracing::debug!(target_player = %player, turn, "embargo proposed");
}

/// Comply with an embargo proposed by another player.
///
/// The target is marked embargoed unconditionally, unless this agent is
/// the target itself.
pub fn embargo_proposed(target: PlayerId, ctx: &mut NegotiationContext<'_>) {
    if target == ctx.seat {
        return;
    }
    let turn = ctx.view.turn;
    ctx.beliefs.set_embargo(target, turn);
}

/// Lift embargoes older than the configured length.
///
/// Returns the players whose embargoes were lifted so the caller can
/// notify the table.
pub fn expire_embargoes(ctx: &mut NegotiationContext<'_>) -> Vec<PlayerId> {
    let length = ctx.policy.embargo.length_turns;
    let turn = ctx.view.turn;
    let expired: Vec<PlayerId> = ctx
        .beliefs
        .active_embargoes()
        .into_iter()
        .filter(|(_player, started)| turn.saturating_sub(*started) >= length)
        .map(|(player, _started)| player)
        .collect();
    for player in &expired {
        ctx.beliefs.lift_embargo(*player);
        tracing::debug!(target_player = %player, turn, "embargo lifted");
    }
    expired
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// Whether to refuse this incoming offer under the block policy.
///
/// True when a block is already in force, or when the leader score and
/// remaining budget justify engaging one -- optionally only for offers
/// that would hand the proposer an immediate build.
pub fn should_block_offer(offer: &TradeOffer, ctx: &NegotiationContext<'_>) -> bool {
    if offer.from == ctx.seat {
        return false;
    }
    if ctx.beliefs.block_started().is_some() {
        return true;
    }

    let policy = &ctx.policy.block;
    if ctx.view.leader_score() < policy.leader_score_threshold
        || ctx.beliefs.block_budget() == 0
    {
        return false;
    }
    if policy.only_if_enables_build {
        return offer_enables_build(offer, ctx);
    }
    true
}

/// Whether the trade would newly let the proposer build immediately.
fn offer_enables_build(offer: &TradeOffer, ctx: &NegotiationContext<'_>) -> bool {
    let before = ctx.beliefs.believed_resources(offer.from);
    let after = before.subtract(&offer.give).add(&offer.get);
    let ports = ctx.view.port_flags(offer.from);
    can_build_any(&after, &ports) && !can_build_any(&before, &ports)
}

/// Engage a block against the resource types this offer requests.
///
/// Records the blocked set with the current turn and spends one block
/// from the budget. No-op when a block is already in force.
pub fn engage_block(offer: &TradeOffer, ctx: &mut NegotiationContext<'_>) {
    if ctx.beliefs.block_started().is_some() {
        return;
    }
    let blocked = offer.get.types().collect();
    let turn = ctx.view.turn;
    ctx.beliefs.set_block(blocked, turn);
    ctx.beliefs.spend_block_budget();
    tracing::debug!(turn, "resource block engaged");
}

/// Reset the blocked-resource set once the block has aged out.
///
/// Returns `true` when a block was lifted.
pub fn expire_blocks(ctx: &mut NegotiationContext<'_>) -> bool {
    let Some(started) = ctx.beliefs.block_started() else {
        return false;
    };
    let turn = ctx.view.turn;
    if turn.saturating_sub(started) < ctx.policy.block.duration_turns {
        return false;
    }
    ctx.beliefs.clear_block();
    tracing::debug!(turn, "resource block lifted");
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
