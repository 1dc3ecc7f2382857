//! Trade offer value objects.
//!
//! A [`TradeOffer`] is always expressed from the proposer's perspective:
//! `give` is what the proposer hands over, `get` is what they receive. An
//! offer with an empty recipient set is a bank (or port) trade requiring
//! no opponent's consent.
//!
//! Two underspecified forms exist:
//!
//! - **Partial**: one side is empty, meaning "unspecified -- the
//!   counterparty proposes it".
//! - **Disjunctive**: one side lists several single-resource alternatives,
//!   any one of which satisfies it.
//!
//! # Invariants
//!
//! `give` and `get` must be disjoint whenever both are non-disjunctive and
//! non-empty (a trade must not cancel itself). The invariant may be
//! violated transiently while an offer is being assembled; engine code
//! checks [`TradeOffer::sides_disjoint`] before emitting anything.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{OfferId, PlayerId};
use crate::resources::ResourceSet;

// ---------------------------------------------------------------------------
// TradeOffer
// ---------------------------------------------------------------------------

/// A proposed exchange of resources between players, or with the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// Identifier for the offer log.
    pub id: OfferId,
    /// The proposing player.
    pub from: PlayerId,
    /// Addressed recipients. Never contains `from`; empty means a bank trade.
    pub to: BTreeSet<PlayerId>,
    /// Resources the proposer hands over.
    pub give: ResourceSet,
    /// Resources the proposer receives.
    pub get: ResourceSet,
    /// Whether `give` lists alternatives rather than a combined bundle.
    pub give_is_disjunctive: bool,
    /// Whether `get` lists alternatives rather than a combined bundle.
    pub get_is_disjunctive: bool,
}

impl TradeOffer {
    /// Create a fully-specified offer addressed to the given recipients.
    pub fn addressed(
        from: PlayerId,
        to: BTreeSet<PlayerId>,
        give: ResourceSet,
        get: ResourceSet,
    ) -> Self {
        Self {
            id: OfferId::new(),
            from,
            to,
            give,
            get,
            give_is_disjunctive: false,
            get_is_disjunctive: false,
        }
    }

    /// Create an offer addressed to a single recipient.
    pub fn to_one(from: PlayerId, to: PlayerId, give: ResourceSet, get: ResourceSet) -> Self {
        let mut recipients = BTreeSet::new();
        recipients.insert(to);
        Self::addressed(from, recipients, give, get)
    }

    /// Create a bank/port trade (no recipients, no consent needed).
    pub fn bank(from: PlayerId, give: ResourceSet, get: ResourceSet) -> Self {
        Self::addressed(from, BTreeSet::new(), give, get)
    }

    /// Whether this is a bank/port trade.
    pub fn is_bank_trade(&self) -> bool {
        self.to.is_empty()
    }

    /// Whether one side is left unspecified for the counterparty to fill.
    pub fn is_partial(&self) -> bool {
        self.give.is_empty() || self.get.is_empty()
    }

    /// Whether either side lists alternatives.
    pub const fn is_disjunctive(&self) -> bool {
        self.give_is_disjunctive || self.get_is_disjunctive
    }

    /// Whether the two sides share no resource type.
    ///
    /// Holds trivially when a side is empty or disjunctive; the invariant
    /// only binds fully-specified conjunctive offers.
    pub fn sides_disjoint(&self) -> bool {
        if self.is_partial() || self.is_disjunctive() {
            return true;
        }
        self.give.disjoint(&self.get)
    }

    /// The offer as seen from a responder's side: give and get swapped,
    /// the original proposer as sole recipient.
    ///
    /// Used when synthesizing counteroffers.
    pub fn inverted(&self, responder: PlayerId) -> Self {
        let mut recipients = BTreeSet::new();
        recipients.insert(self.from);
        Self {
            id: OfferId::new(),
            from: responder,
            to: recipients,
            give: self.get.clone(),
            get: self.give.clone(),
            give_is_disjunctive: self.get_is_disjunctive,
            get_is_disjunctive: self.give_is_disjunctive,
        }
    }

    /// Structural equality of the trade surface, ignoring the offer id.
    ///
    /// This is the repeat-detection comparison used against the offer log.
    pub fn same_exchange(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.give == other.give
            && self.get == other.get
            && self.give_is_disjunctive == other.give_is_disjunctive
            && self.get_is_disjunctive == other.get_is_disjunctive
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
