//! Build pieces and the agent's build plan.
//!
//! Each piece has a fixed resource cost. A [`BuildPlan`] is an ordered
//! stack of target pieces, most-urgent on top; summing the costs of the
//! entries under consideration gives the resource target fed into the
//! production-speed estimator.

use serde::{Deserialize, Serialize};

use crate::resources::{Resource, ResourceSet};

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A buildable piece.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Piece {
    /// A road segment.
    Road,
    /// A settlement.
    Settlement,
    /// A city upgrade.
    City,
    /// A development card.
    DevelopmentCard,
}

impl Piece {
    /// Every piece type, in canonical order.
    pub const ALL: [Self; 4] = [Self::Road, Self::Settlement, Self::City, Self::DevelopmentCard];

    /// The fixed resource cost of this piece.
    pub fn cost(self) -> ResourceSet {
        match self {
            Self::Road => [(Resource::Clay, 1), (Resource::Wood, 1)]
                .into_iter()
                .collect(),
            Self::Settlement => [
                (Resource::Clay, 1),
                (Resource::Wood, 1),
                (Resource::Sheep, 1),
                (Resource::Wheat, 1),
            ]
            .into_iter()
            .collect(),
            Self::City => [(Resource::Ore, 3), (Resource::Wheat, 2)]
                .into_iter()
                .collect(),
            Self::DevelopmentCard => [
                (Resource::Ore, 1),
                (Resource::Sheep, 1),
                (Resource::Wheat, 1),
            ]
            .into_iter()
            .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// BuildPlan
// ---------------------------------------------------------------------------

/// An ordered stack of build targets, most-urgent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pieces: Vec<Piece>,
}

impl BuildPlan {
    /// Create a plan from pieces ordered most-urgent first.
    pub const fn new(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    /// The most urgent piece, if any.
    pub fn peek(&self) -> Option<Piece> {
        self.pieces.first().copied()
    }

    /// Whether the plan has no entries.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The planned pieces, most-urgent first.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Sum of the costs of the first `depth` plan entries.
    ///
    /// A `depth` beyond the plan length covers the whole plan.
    pub fn target_resources(&self, depth: usize) -> ResourceSet {
        self.pieces
            .iter()
            .take(depth)
            .fold(ResourceSet::new(), |acc, piece| acc.add(&piece.cost()))
    }

    /// Sum of the costs of every plan entry.
    pub fn full_target(&self) -> ResourceSet {
        self.target_resources(self.pieces.len())
    }

    /// The plan-independent tie-breaker target: one of every piece type.
    pub fn global_target() -> ResourceSet {
        Piece::ALL
            .iter()
            .fold(ResourceSet::new(), |acc, piece| acc.add(&piece.cost()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
