//! Trade-negotiation decision engine for the Parley agent.
//!
//! This crate decides, for one agent in a four-player resource-trading
//! board game: which offers are worth proposing, whether to accept,
//! reject, or counter an incoming offer, how to complete underspecified
//! (partial or disjunctive) offers, and whether to declare a trade
//! binding. Heterogeneous trades are compared through one common
//! currency -- the estimated number of turns until the agent's build
//! plan is affordable -- measured against the best bank/port trade
//! reachable without anyone's consent.
//!
//! The engine is synchronous and message-driven: one decision is
//! computed to completion per call, against a [`NegotiationContext`]
//! assembled by the session layer. All persistent knowledge lives behind
//! the [`BeliefStore`] interface.
//!
//! # Modules
//!
//! - [`policy`] -- Immutable negotiation configuration ([`NegotiationPolicy`])
//! - [`estimator`] -- Production-speed trait and ETA adapter
//! - [`batna`] -- Best bank/port alternative resolution
//! - [`catalog`] -- Exhaustive offer enumeration
//! - [`oracle`] -- The shared acceptance rule, responder and predictor modes
//! - [`pipeline`] -- Ordered removal filters and offer aggregation
//! - [`synthesizer`] -- Offer/counteroffer synthesis and completion
//! - [`persuasion`] -- Force-accept gates and combinator
//! - [`sanctions`] -- Embargo and block policies
//! - [`belief`] -- Memory collaborator interface ([`BeliefStore`])
//! - [`context`] -- Per-decision context bundle
//! - [`engine`] -- Top-level facade ([`NegotiationEngine`])

pub mod batna;
pub mod belief;
pub mod catalog;
pub mod context;
pub mod engine;
pub mod estimator;
pub mod oracle;
pub mod persuasion;
pub mod pipeline;
pub mod policy;
pub mod sanctions;
pub mod synthesizer;

// Re-export primary types at crate root for convenience.
pub use batna::resolve_batna;
pub use belief::{BeliefStore, CompletedTrade, InMemoryBeliefStore};
pub use catalog::legal_offers;
pub use context::NegotiationContext;
pub use engine::{NegotiationEngine, TurnEvents};
pub use estimator::{EtaEvaluator, ProductionEstimator, TableEstimator};
pub use oracle::{accept_trade, decide, plausibly_holds, predict_response};
pub use policy::{
    AcceptancePolicy, AggregationPolicy, BlockPolicy, CatalogPolicy, CompletionPolicy,
    CompletionStrategy, ConfigError, EmbargoPolicy, NegotiationPolicy, PersuasionPolicy,
    PipelinePolicy, PlausibilityMode,
};
pub use synthesizer::{complete_offer, make_counter_offer, make_offer};
