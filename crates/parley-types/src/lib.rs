//! Shared type definitions for the Parley negotiation engine.
//!
//! This crate is the single source of truth for the value objects that
//! cross the engine's boundaries: resource multisets, trade offers, build
//! plans, bounded turn estimates, and the board-state snapshot consumed
//! per decision. It contains no decision logic.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers (seats, offer-log entries)
//! - [`resources`] -- [`Resource`] and the [`ResourceSet`] multiset
//! - [`eta`] -- Bounded saturating turn estimates ([`Eta`])
//! - [`offer`] -- [`TradeOffer`] with partial/disjunctive forms
//! - [`plan`] -- [`Piece`] costs and the [`BuildPlan`] stack
//! - [`view`] -- [`GameView`] board snapshot and [`PortFlags`]
//! - [`decision`] -- Decision outputs and ranking annotations

pub mod decision;
pub mod eta;
pub mod ids;
pub mod offer;
pub mod plan;
pub mod resources;
pub mod view;

// Re-export primary types at crate root for convenience.
pub use decision::{OfferResponse, RatedOffer, TradeVerdict};
pub use eta::Eta;
pub use ids::{OfferId, PlayerId};
pub use offer::TradeOffer;
pub use plan::{BuildPlan, Piece};
pub use resources::{Resource, ResourceSet};
pub use view::{GameView, PortFlags};
