//! Type-safe identifier wrappers.
//!
//! Players are addressed by their seat at the table, offers by a UUID v7
//! (time-ordered) so the offer log can be scanned chronologically. Wrapping
//! both in newtypes prevents accidental mixing of identifiers at compile
//! time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A player's seat at the table.
///
/// The board addresses at most four players by position, so a compact seat
/// index is used instead of a UUID. Seats are stable for the whole game;
/// the default value is the first seat.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Create a player identifier for the given seat index.
    pub const fn new(seat: u8) -> Self {
        Self(seat)
    }

    /// Return the raw seat index.
    pub const fn seat(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<u8> for PlayerId {
    fn from(seat: u8) -> Self {
        Self(seat)
    }
}

// ---------------------------------------------------------------------------
// OfferId
// ---------------------------------------------------------------------------

/// Unique identifier for a trade offer.
///
/// Used by the offer log for chronological scans; structural repeat
/// detection compares offer contents, never IDs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OfferId(pub Uuid);

impl OfferId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for OfferId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_displays_seat() {
        assert_eq!(PlayerId::new(2).to_string(), "P2");
    }

    #[test]
    fn player_ids_order_by_seat() {
        assert!(PlayerId::new(0) < PlayerId::new(3));
    }

    #[test]
    fn offer_id_roundtrip_serde() {
        let original = OfferId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<OfferId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn offer_id_display_matches_uuid() {
        let id = OfferId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
