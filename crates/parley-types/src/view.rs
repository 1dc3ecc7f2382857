//! Read-only board/game state snapshot consumed per decision.
//!
//! The engine never reaches into the board directly; the session layer
//! assembles a [`GameView`] before every decision, mirroring what the
//! acting player can publicly see: scores, port ownership, the turn
//! counter, and which seat pairs are contesting the same board location.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::resources::Resource;

// ---------------------------------------------------------------------------
// PortFlags
// ---------------------------------------------------------------------------

/// Port ownership for one player, determining bank trade ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFlags {
    /// Whether the player owns a generic 3:1 port.
    pub generic: bool,
    /// Resource types for which the player owns a specific 2:1 port.
    pub specific: BTreeSet<Resource>,
}

impl PortFlags {
    /// The bank trade ratio for the given resource: 2, 3 or 4 units per 1.
    pub fn ratio_for(&self, resource: Resource) -> u32 {
        if self.specific.contains(&resource) {
            2
        } else if self.generic {
            3
        } else {
            4
        }
    }
}

// ---------------------------------------------------------------------------
// GameView
// ---------------------------------------------------------------------------

/// A snapshot of public game state for one decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// The acting player's seat.
    pub seat: PlayerId,
    /// The current turn counter.
    pub turn: u64,
    /// Maximum number of players in this game.
    pub max_players: u8,
    /// Public score per seated player.
    pub scores: BTreeMap<PlayerId, u32>,
    /// Port ownership per seated player.
    pub ports: BTreeMap<PlayerId, PortFlags>,
    /// Seat pairs currently racing for the same board location.
    ///
    /// Stored with the lower seat first; query through
    /// [`GameView::are_contesting`], which is order-insensitive.
    pub contested: BTreeSet<(PlayerId, PlayerId)>,
}

impl GameView {
    /// The public score of a player (zero when unseated).
    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    /// The player currently holding the highest public score.
    pub fn leader(&self) -> Option<PlayerId> {
        self.scores
            .iter()
            .max_by_key(|(player, score)| (**score, core::cmp::Reverse(**player)))
            .map(|(player, _score)| *player)
    }

    /// The highest public score at the table.
    pub fn leader_score(&self) -> u32 {
        self.scores.values().copied().max().unwrap_or(0)
    }

    /// Whether two players are racing for the same board location.
    pub fn are_contesting(&self, a: PlayerId, b: PlayerId) -> bool {
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.contested.contains(&pair)
    }

    /// Every seated player other than `player`, in seat order.
    pub fn opponents_of(&self, player: PlayerId) -> Vec<PlayerId> {
        self.scores
            .keys()
            .copied()
            .filter(|seat| *seat != player)
            .collect()
    }

    /// Port ownership for a player (no ports when unseated).
    pub fn port_flags(&self, player: PlayerId) -> PortFlags {
        self.ports.get(&player).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
