//! Decision outputs and ranking annotations.
//!
//! These are the values the engine hands back to the transport layer: a
//! response per incoming offer, or a proposal when the agent decides to
//! open a negotiation itself.

use serde::{Deserialize, Serialize};

use crate::eta::Eta;
use crate::offer::TradeOffer;

// ---------------------------------------------------------------------------
// Verdicts and responses
// ---------------------------------------------------------------------------

/// The acceptance oracle's verdict on a fully-specified offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeVerdict {
    /// The trade beats the baseline; take it.
    Accept,
    /// The trade is implausible, dangerous, or worse than the baseline.
    Reject,
    /// The trade is worth renegotiating rather than dropping.
    Counter,
}

/// The engine's answer to one incoming trade message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferResponse {
    /// Accept the offer as proposed.
    Accept,
    /// Decline the offer.
    Reject,
    /// Decline, but propose this exchange instead.
    Counter(TradeOffer),
    /// The incoming offer was partial or disjunctive; this completes it.
    Complete(TradeOffer),
}

// ---------------------------------------------------------------------------
// RatedOffer
// ---------------------------------------------------------------------------

/// A [`TradeOffer`] annotated with turn estimates for ranking.
///
/// `eta` measures turns to the acting player's current build-plan target
/// after the trade; `global_eta` measures turns to a target requiring one
/// of every piece type, a tie-breaker independent of the current plan.
/// Created transiently while ranking candidates and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedOffer {
    /// The underlying offer.
    pub offer: TradeOffer,
    /// Turns to the current build-plan target after this trade.
    pub eta: Eta,
    /// Turns to the every-piece target after this trade.
    pub global_eta: Eta,
}

impl RatedOffer {
    /// Annotate an offer with its turn estimates.
    pub const fn new(offer: TradeOffer, eta: Eta, global_eta: Eta) -> Self {
        Self {
            offer,
            eta,
            global_eta,
        }
    }

    /// The ascending sort key used for ranking: plan ETA, then global ETA.
    pub const fn rank_key(&self) -> (Eta, Eta) {
        (self.eta, self.global_eta)
    }
}
