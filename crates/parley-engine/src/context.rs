//! Per-decision context assembled by the session layer.
//!
//! A [`NegotiationContext`] bundles everything one decision needs: the
//! acting player's hand and build plan, the public board snapshot, the
//! immutable policy, the production estimator, and the belief store. It
//! is assembled fresh for each decision and discarded afterwards; only
//! the belief store behind it outlives the call.

use parley_types::{BuildPlan, Eta, GameView, PlayerId, PortFlags, ResourceSet};

use crate::belief::BeliefStore;
use crate::estimator::{EtaEvaluator, ProductionEstimator};
use crate::policy::NegotiationPolicy;

/// Everything one negotiation decision reads, plus the one store it may
/// write.
pub struct NegotiationContext<'a> {
    /// The acting player's seat.
    pub seat: PlayerId,
    /// The acting player's own hand (never contains `Unknown`).
    pub resources: &'a ResourceSet,
    /// The acting player's build plan, most-urgent first.
    pub plan: &'a BuildPlan,
    /// Public board snapshot.
    pub view: &'a GameView,
    /// Immutable negotiation configuration.
    pub policy: &'a NegotiationPolicy,
    /// Production-speed estimator for the acting player's board position.
    pub estimator: &'a dyn ProductionEstimator,
    /// The memory collaborator (single writer per turn).
    pub beliefs: &'a mut dyn BeliefStore,
}

impl NegotiationContext<'_> {
    /// The resource target implied by the whole build plan.
    pub fn target(&self) -> ResourceSet {
        self.plan.full_target()
    }

    /// The acting player's port flags.
    pub fn own_ports(&self) -> PortFlags {
        self.view.port_flags(self.seat)
    }

    /// Turns to the build-plan target after a hypothetical trade.
    pub fn eta_after(&self, give: &ResourceSet, get: &ResourceSet) -> Eta {
        EtaEvaluator::new(self.estimator).eta(
            self.resources,
            &self.target(),
            give,
            get,
            &self.own_ports(),
        )
    }

    /// Turns to the every-piece tie-breaker target after a hypothetical
    /// trade.
    pub fn global_eta_after(&self, give: &ResourceSet, get: &ResourceSet) -> Eta {
        EtaEvaluator::new(self.estimator).eta(
            self.resources,
            &BuildPlan::global_target(),
            give,
            get,
            &self.own_ports(),
        )
    }

    /// Turns to the build-plan target with the hand as it stands.
    pub fn current_eta(&self) -> Eta {
        self.eta_after(&ResourceSet::new(), &ResourceSet::new())
    }
}
