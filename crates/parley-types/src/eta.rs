//! Bounded turn-count estimates.
//!
//! The production-speed estimator answers "how many turns until I can
//! afford this target?" with a bounded search. When the search cannot
//! bound the answer, the result is the explicit [`Eta::UNREACHABLE`]
//! cutoff rather than a raw sentinel integer, so arithmetic near the
//! bound saturates instead of silently wrapping past it.
//!
//! The cutoff participates in comparisons ("no better than never") but is
//! never treated as infinity in arithmetic.

use serde::{Deserialize, Serialize};

/// An estimated number of turns to accumulate a target resource set.
///
/// Values saturate at [`Eta::UNREACHABLE`]; ordering is the plain numeric
/// ordering, so the cutoff compares greater than every bounded estimate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Eta(u32);

impl Eta {
    /// An immediate build: the target is affordable right now.
    pub const ZERO: Self = Self(0);

    /// The bounded-search cutoff: the estimator could not bound the answer.
    pub const UNREACHABLE: Self = Self(1000);

    /// Create an estimate, clamping at the cutoff.
    pub const fn new(turns: u32) -> Self {
        if turns >= Self::UNREACHABLE.0 {
            Self::UNREACHABLE
        } else {
            Self(turns)
        }
    }

    /// The estimated turn count. The cutoff reads as its numeric value.
    pub const fn turns(self) -> u32 {
        self.0
    }

    /// Whether the estimator could not bound this estimate.
    pub const fn is_unreachable(self) -> bool {
        self.0 >= Self::UNREACHABLE.0
    }

    /// Whether the target is affordable without waiting a single turn.
    pub const fn is_immediate(self) -> bool {
        self.0 == 0
    }

    /// Add turns, saturating at the cutoff.
    pub const fn saturating_add(self, turns: u32) -> Self {
        Self::new(self.0.saturating_add(turns))
    }

    /// How many turns faster `self` is than `other` (zero when slower).
    pub const fn improvement_over(self, other: Self) -> u32 {
        other.0.saturating_sub(self.0)
    }
}

impl core::fmt::Display for Eta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_unreachable() {
            write!(f, "unreachable")
        } else {
            write!(f, "{} turns", self.0)
        }
    }
}
