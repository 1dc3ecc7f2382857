//! Negotiation policy loading and typed configuration structures.
//!
//! Every optional behavior in the engine -- acceptance thresholds,
//! plausibility mode, aggregation limits, persuasion gates, embargo and
//! block parameters -- is a named, typed field in [`NegotiationPolicy`].
//! The bundle is constructed once per agent at startup (from YAML or
//! defaults) and is read-only thereafter; no component consults ambient
//! configuration.
//!
//! All fields have defaults matching the values in the design documents,
//! so a partial (or empty) YAML file is always valid.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a policy file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the policy file from disk.
    #[error("failed to read policy file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse policy YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Enumerated modes
// ---------------------------------------------------------------------------

/// How to judge whether a player plausibly holds a resource set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlausibilityMode {
    /// Unidentified cards could be anything; give the player the benefit
    /// of the doubt.
    #[default]
    Optimistic,
    /// Only positively identified cards count.
    Pessimistic,
}

/// How to pick among candidate completions of a partial offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStrategy {
    /// Pick the candidate best for this agent, among those it would accept.
    OwnBest,
    /// Pick the candidate the opponent should accept that concedes them
    /// the least.
    OpponentWorst,
    /// Pick only from candidates both sides should accept.
    Intersection,
    /// Prefer the intersection, then fall back to own-best, then to the
    /// opponent's list.
    #[default]
    IntersectionFirst,
}

// ---------------------------------------------------------------------------
// Policy sections
// ---------------------------------------------------------------------------

/// Thresholds for the shared trade-acceptance rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AcceptancePolicy {
    /// Minimum whole-turn improvement over the baseline before accepting.
    #[serde(default = "default_min_improvement_turns")]
    pub min_improvement_turns: u32,

    /// Optional minimum relative improvement (improvement / baseline ETA).
    #[serde(default)]
    pub min_improvement_ratio: Option<Decimal>,

    /// How to judge whether players hold what an offer asks of them.
    #[serde(default)]
    pub plausibility: PlausibilityMode,

    /// A proposer whose estimated turns-to-win falls below this value is
    /// treated as imminently winning; their offers are refused outright.
    #[serde(default = "default_race_win_eta")]
    pub race_win_eta: u32,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            min_improvement_turns: default_min_improvement_turns(),
            min_improvement_ratio: None,
            plausibility: PlausibilityMode::default(),
            race_win_eta: default_race_win_eta(),
        }
    }
}

/// Which offer shapes the catalog generator emits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogPolicy {
    /// Emit give-2-for-1 variants when two of the give type are held.
    #[serde(default = "default_true")]
    pub allow_two_for_one: bool,

    /// Emit give-1-for-2 variants.
    #[serde(default = "default_true")]
    pub allow_one_for_two: bool,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            allow_two_for_one: true,
            allow_one_for_two: true,
        }
    }
}

/// Which removal filters the candidate pipeline applies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelinePolicy {
    /// Drop offers that are strict non-improvements over past offers.
    #[serde(default = "default_true")]
    pub history_filter: bool,

    /// Drop single-recipient offers that reverse a just-completed trade.
    #[serde(default = "default_true")]
    pub reverse_exchange_filter: bool,

    /// Drop offers whose give side eats into build-plan requirements.
    #[serde(default = "default_true")]
    pub plan_safety_filter: bool,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            history_filter: true,
            reverse_exchange_filter: true,
            plan_safety_filter: true,
        }
    }
}

/// Limits on merging compatible offers into disjunctive/partial forms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggregationPolicy {
    /// Allow merging into partial offers (cleared side) when a
    /// disjunctive merge is not possible.
    #[serde(default = "default_true")]
    pub allow_partial_merge: bool,

    /// Maximum distinct resource types a merged offer may mention.
    #[serde(default = "default_max_merged_types")]
    pub max_merged_types: usize,

    /// Optional cap on the ETA difference between two merged inputs.
    #[serde(default)]
    pub max_eta_divergence: Option<u32>,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            allow_partial_merge: true,
            max_merged_types: default_max_merged_types(),
            max_eta_divergence: None,
        }
    }
}

/// Strategy for completing partial and disjunctive offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompletionPolicy {
    /// How to pick among candidate completions.
    #[serde(default)]
    pub strategy: CompletionStrategy,
}

/// Gates controlling when a trade may be declared binding.
///
/// Each gate is independently togglable; a disabled gate never rejects.
/// The force budget and leader-score floor apply regardless of the gates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersuasionPolicy {
    /// Only force an offer that was previously rejected.
    #[serde(default)]
    pub require_prior_rejection: bool,

    /// Only force an offer that yields the proposer an immediate build.
    #[serde(default)]
    pub require_immediate_build: bool,

    /// Require that a recipient can build immediately after the trade.
    #[serde(default)]
    pub require_recipient_build: bool,

    /// Strengthen the build gate: the recipient must not have been able
    /// to build before the trade.
    #[serde(default)]
    pub recipient_build_not_before: bool,

    /// Require that a recipient can bank/port trade after the trade.
    #[serde(default)]
    pub require_recipient_bank_trade: bool,

    /// Strengthen the bank gate: the bank trade must not have been
    /// possible before.
    #[serde(default)]
    pub recipient_bank_trade_not_before: bool,

    /// Require that a recipient can bank trade into a one-resource-away
    /// build after the trade.
    #[serde(default)]
    pub require_recipient_bank_then_build: bool,

    /// Strengthen the bank-then-build gate with the not-possible-before
    /// variant.
    #[serde(default)]
    pub recipient_bank_then_build_not_before: bool,

    /// Forgive failed gates when any miscellaneous qualifying move exists
    /// for some recipient.
    #[serde(default)]
    pub allow_any_qualifying_move: bool,

    /// Number of force-accept declarations allowed per game.
    #[serde(default = "default_force_budget")]
    pub force_budget: u32,

    /// Minimum leader score before forcing is considered at all.
    #[serde(default)]
    pub min_leader_score: u32,
}

impl Default for PersuasionPolicy {
    fn default() -> Self {
        Self {
            require_prior_rejection: false,
            require_immediate_build: false,
            require_recipient_build: false,
            recipient_build_not_before: false,
            require_recipient_bank_trade: false,
            recipient_bank_trade_not_before: false,
            require_recipient_bank_then_build: false,
            recipient_bank_then_build_not_before: false,
            allow_any_qualifying_move: false,
            force_budget: default_force_budget(),
            min_leader_score: 0,
        }
    }
}

/// Parameters for proposing and honoring embargoes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbargoPolicy {
    /// Public score at which a player becomes an embargo candidate.
    #[serde(default = "default_embargo_score_threshold")]
    pub score_threshold: u32,

    /// Maximum embargoes this agent keeps active at once.
    #[serde(default = "default_embargo_max_active")]
    pub max_active: usize,

    /// Number of embargo proposals allowed per game.
    #[serde(default = "default_embargo_budget")]
    pub propose_budget: u32,

    /// Turns an embargo stays in force before it lifts.
    #[serde(default = "default_embargo_length")]
    pub length_turns: u64,
}

impl Default for EmbargoPolicy {
    fn default() -> Self {
        Self {
            score_threshold: default_embargo_score_threshold(),
            max_active: default_embargo_max_active(),
            propose_budget: default_embargo_budget(),
            length_turns: default_embargo_length(),
        }
    }
}

/// Parameters for blocking incoming offers on specific resources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockPolicy {
    /// Leader score at which blocking engages.
    #[serde(default = "default_block_leader_threshold")]
    pub leader_score_threshold: u32,

    /// Number of blocks allowed per game.
    #[serde(default = "default_block_budget")]
    pub propose_budget: u32,

    /// Only block offers that would enable the proposer an immediate
    /// build.
    #[serde(default)]
    pub only_if_enables_build: bool,

    /// Turns a block stays in force before the blocked set resets.
    #[serde(default = "default_block_duration")]
    pub duration_turns: u64,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            leader_score_threshold: default_block_leader_threshold(),
            propose_budget: default_block_budget(),
            only_if_enables_build: false,
            duration_turns: default_block_duration(),
        }
    }
}

// ---------------------------------------------------------------------------
// NegotiationPolicy
// ---------------------------------------------------------------------------

/// The complete, immutable negotiation configuration for one agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NegotiationPolicy {
    /// Shared acceptance-rule thresholds.
    #[serde(default)]
    pub acceptance: AcceptancePolicy,

    /// Offer catalog shape toggles.
    #[serde(default)]
    pub catalog: CatalogPolicy,

    /// Candidate pipeline filter toggles.
    #[serde(default)]
    pub pipeline: PipelinePolicy,

    /// Offer aggregation limits.
    #[serde(default)]
    pub aggregation: AggregationPolicy,

    /// Partial/disjunctive completion strategy.
    #[serde(default)]
    pub completion: CompletionPolicy,

    /// Force-accept gates and budget.
    #[serde(default)]
    pub persuasion: PersuasionPolicy,

    /// Embargo parameters.
    #[serde(default)]
    pub embargo: EmbargoPolicy,

    /// Block parameters.
    #[serde(default)]
    pub block: BlockPolicy,

    /// RNG seed for tie-breaks, making decision sequences reproducible.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            acceptance: AcceptancePolicy::default(),
            catalog: CatalogPolicy::default(),
            pipeline: PipelinePolicy::default(),
            aggregation: AggregationPolicy::default(),
            completion: CompletionPolicy::default(),
            persuasion: PersuasionPolicy::default(),
            embargo: EmbargoPolicy::default(),
            block: BlockPolicy::default(),
            seed: default_seed(),
        }
    }
}

impl NegotiationPolicy {
    /// Load a policy from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse a policy from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_min_improvement_turns() -> u32 {
    1
}

const fn default_race_win_eta() -> u32 {
    4
}

const fn default_max_merged_types() -> usize {
    3
}

const fn default_force_budget() -> u32 {
    3
}

const fn default_embargo_score_threshold() -> u32 {
    8
}

const fn default_embargo_max_active() -> usize {
    1
}

const fn default_embargo_budget() -> u32 {
    1
}

const fn default_embargo_length() -> u64 {
    8
}

const fn default_block_leader_threshold() -> u32 {
    8
}

const fn default_block_budget() -> u32 {
    1
}

const fn default_block_duration() -> u64 {
    4
}

const fn default_seed() -> u64 {
    42
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
