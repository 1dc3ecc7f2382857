//! Belief/memory store interface and in-memory implementation.
//!
//! Everything the engine knows that is not on the public board lives
//! behind [`BeliefStore`]: believed opponent hands, selling signals, the
//! past-offer log, completed-trade records, sanction state, and the
//! force/embargo/block budgets. The store is passed as an explicit
//! dependency into every decision call -- there is no ambient memory
//! object.
//!
//! # Single-writer-per-turn contract
//!
//! Exactly one agent's decision call reads and mutates a store per turn.
//! The engine itself therefore takes no locks; a host that shares one
//! store between several engines (e.g. when running opponent-response
//! prediction against the same game) must serialize access.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use parley_types::{BuildPlan, PlayerId, Resource, ResourceSet, TradeOffer};

// ---------------------------------------------------------------------------
// CompletedTrade
// ---------------------------------------------------------------------------

/// A record of a trade this agent completed with another player.
///
/// Kept so the pipeline can refuse to immediately reverse an exchange
/// ("buy back what you just sold").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrade {
    /// The counterparty.
    pub with: PlayerId,
    /// What this agent handed over.
    pub gave: ResourceSet,
    /// What this agent received.
    pub received: ResourceSet,
    /// The turn the trade completed.
    pub turn: u64,
}

// ---------------------------------------------------------------------------
// BeliefStore
// ---------------------------------------------------------------------------

/// The memory collaborator consumed by every engine component.
///
/// Read operations answer from current beliefs; mutating operations are
/// invoked only by the owning agent's decision call (see the module-level
/// single-writer contract).
pub trait BeliefStore {
    // --- Opponent beliefs -------------------------------------------------

    /// Believed resources of a player, `Unknown` included for cards whose
    /// type has not been observed.
    fn believed_resources(&self, player: PlayerId) -> ResourceSet;

    /// Replace the believed resources of a player.
    fn set_believed_resources(&mut self, player: PlayerId, resources: ResourceSet);

    /// Whether a player is believed willing to sell a resource type.
    ///
    /// `None` means no signal has been observed either way.
    fn is_selling(&self, player: PlayerId, resource: Resource) -> Option<bool>;

    /// Record a selling signal for a player and resource type.
    fn set_selling(&mut self, player: PlayerId, resource: Resource, selling: bool);

    /// Best-guess build plan for an opponent.
    fn predicted_plan(&self, player: PlayerId) -> BuildPlan;

    /// Replace the predicted build plan for an opponent.
    fn set_predicted_plan(&mut self, player: PlayerId, plan: BuildPlan);

    // --- Offer history ----------------------------------------------------

    /// Append an offer this agent has made to the log.
    fn record_offer(&mut self, offer: TradeOffer);

    /// Whether a structurally identical offer was made before.
    fn was_offered(&self, offer: &TradeOffer) -> bool;

    /// Every offer this agent has made, oldest first.
    fn past_offers(&self) -> Vec<TradeOffer>;

    /// Record a completed trade with another player.
    fn record_completed(&mut self, trade: CompletedTrade);

    /// The most recent completed trade with a player, if any.
    fn last_completed_with(&self, player: PlayerId) -> Option<CompletedTrade>;

    /// Tally a player's response to one of this agent's offers.
    fn record_response(&mut self, player: PlayerId, accepted: bool);

    /// Fraction of this agent's offers the player has accepted.
    ///
    /// `None` until at least one response has been tallied.
    fn acceptance_rate(&self, player: PlayerId) -> Option<Decimal>;

    // --- Sanction state ---------------------------------------------------

    /// Players currently embargoed, with the turn each embargo started.
    fn active_embargoes(&self) -> BTreeMap<PlayerId, u64>;

    /// Whether a player is currently embargoed.
    fn is_embargoed(&self, player: PlayerId) -> bool;

    /// Mark a player embargoed as of the given turn.
    fn set_embargo(&mut self, player: PlayerId, start_turn: u64);

    /// Lift the embargo on a player.
    fn lift_embargo(&mut self, player: PlayerId);

    /// Resource types currently under a self-imposed block.
    fn blocked_resources(&self) -> BTreeSet<Resource>;

    /// The turn the current block started, if one is active.
    fn block_started(&self) -> Option<u64>;

    /// Impose a block on the given resource types as of the given turn.
    fn set_block(&mut self, resources: BTreeSet<Resource>, start_turn: u64);

    /// Clear the active block.
    fn clear_block(&mut self);

    // --- Budgets ----------------------------------------------------------

    /// Remaining force-accept declarations.
    fn force_budget(&self) -> u32;

    /// Spend one force-accept declaration.
    fn spend_force_budget(&mut self);

    /// Remaining embargo proposals.
    fn embargo_budget(&self) -> u32;

    /// Spend one embargo proposal.
    fn spend_embargo_budget(&mut self);

    /// Remaining block impositions.
    fn block_budget(&self) -> u32;

    /// Spend one block imposition.
    fn spend_block_budget(&mut self);
}

// ---------------------------------------------------------------------------
// InMemoryBeliefStore
// ---------------------------------------------------------------------------

/// A complete `BTreeMap`-backed [`BeliefStore`].
///
/// The default in-process memory collaborator, also used throughout the
/// test suites. Budgets are seeded at construction, typically from the
/// policy-configured values.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBeliefStore {
    believed: BTreeMap<PlayerId, ResourceSet>,
    selling: BTreeMap<(PlayerId, Resource), bool>,
    predicted_plans: BTreeMap<PlayerId, BuildPlan>,
    offer_log: Vec<TradeOffer>,
    completed: Vec<CompletedTrade>,
    responses: BTreeMap<PlayerId, (u32, u32)>,
    embargoes: BTreeMap<PlayerId, u64>,
    block: Option<(BTreeSet<Resource>, u64)>,
    force_budget: u32,
    embargo_budget: u32,
    block_budget: u32,
}

impl InMemoryBeliefStore {
    /// Create an empty store with zero budgets.
    pub const fn new() -> Self {
        Self {
            believed: BTreeMap::new(),
            selling: BTreeMap::new(),
            predicted_plans: BTreeMap::new(),
            offer_log: Vec::new(),
            completed: Vec::new(),
            responses: BTreeMap::new(),
            embargoes: BTreeMap::new(),
            block: None,
            force_budget: 0,
            embargo_budget: 0,
            block_budget: 0,
        }
    }

    /// Create an empty store with the given budgets.
    #[must_use]
    pub const fn with_budgets(force: u32, embargo: u32, block: u32) -> Self {
        let mut store = Self::new();
        store.force_budget = force;
        store.embargo_budget = embargo;
        store.block_budget = block;
        store
    }

    /// Number of offers recorded in the log.
    pub fn offer_log_len(&self) -> usize {
        self.offer_log.len()
    }
}

impl BeliefStore for InMemoryBeliefStore {
    fn believed_resources(&self, player: PlayerId) -> ResourceSet {
        self.believed.get(&player).cloned().unwrap_or_default()
    }

    fn set_believed_resources(&mut self, player: PlayerId, resources: ResourceSet) {
        self.believed.insert(player, resources);
    }

    fn is_selling(&self, player: PlayerId, resource: Resource) -> Option<bool> {
        self.selling.get(&(player, resource)).copied()
    }

    fn set_selling(&mut self, player: PlayerId, resource: Resource, selling: bool) {
        self.selling.insert((player, resource), selling);
    }

    fn predicted_plan(&self, player: PlayerId) -> BuildPlan {
        self.predicted_plans
            .get(&player)
            .cloned()
            .unwrap_or_default()
    }

    fn set_predicted_plan(&mut self, player: PlayerId, plan: BuildPlan) {
        self.predicted_plans.insert(player, plan);
    }

    fn record_offer(&mut self, offer: TradeOffer) {
        self.offer_log.push(offer);
    }

    fn was_offered(&self, offer: &TradeOffer) -> bool {
        self.offer_log.iter().any(|past| past.same_exchange(offer))
    }

    fn past_offers(&self) -> Vec<TradeOffer> {
        self.offer_log.clone()
    }

    fn record_completed(&mut self, trade: CompletedTrade) {
        self.completed.push(trade);
    }

    fn last_completed_with(&self, player: PlayerId) -> Option<CompletedTrade> {
        self.completed
            .iter()
            .rev()
            .find(|trade| trade.with == player)
            .cloned()
    }

    fn record_response(&mut self, player: PlayerId, accepted: bool) {
        let entry = self.responses.entry(player).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(1);
        if accepted {
            entry.1 = entry.1.saturating_add(1);
        }
    }

    fn acceptance_rate(&self, player: PlayerId) -> Option<Decimal> {
        let (total, accepted) = self.responses.get(&player).copied()?;
        if total == 0 {
            return None;
        }
        Decimal::from(accepted).checked_div(Decimal::from(total))
    }

    fn active_embargoes(&self) -> BTreeMap<PlayerId, u64> {
        self.embargoes.clone()
    }

    fn is_embargoed(&self, player: PlayerId) -> bool {
        self.embargoes.contains_key(&player)
    }

    fn set_embargo(&mut self, player: PlayerId, start_turn: u64) {
        self.embargoes.insert(player, start_turn);
    }

    fn lift_embargo(&mut self, player: PlayerId) {
        self.embargoes.remove(&player);
    }

    fn blocked_resources(&self) -> BTreeSet<Resource> {
        self.block
            .as_ref()
            .map(|(resources, _start)| resources.clone())
            .unwrap_or_default()
    }

    fn block_started(&self) -> Option<u64> {
        self.block.as_ref().map(|(_resources, start)| *start)
    }

    fn set_block(&mut self, resources: BTreeSet<Resource>, start_turn: u64) {
        self.block = Some((resources, start_turn));
    }

    fn clear_block(&mut self) {
        self.block = None;
    }

    fn force_budget(&self) -> u32 {
        self.force_budget
    }

    fn spend_force_budget(&mut self) {
        self.force_budget = self.force_budget.saturating_sub(1);
    }

    fn embargo_budget(&self) -> u32 {
        self.embargo_budget
    }

    fn spend_embargo_budget(&mut self) {
        self.embargo_budget = self.embargo_budget.saturating_sub(1);
    }

    fn block_budget(&self) -> u32 {
        self.block_budget
    }

    fn spend_block_budget(&mut self) {
        self.block_budget = self.block_budget.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
