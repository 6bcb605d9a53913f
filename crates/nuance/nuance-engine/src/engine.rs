//! The refinement engine: policy + clock + providers, with the operators
//! implemented as methods across the `operators` module.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use nuance_core::clock::IClock;
use nuance_core::errors::NuanceResult;
use nuance_core::policy::{Policy, RelevanceFn};
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::{invariants, State};

use crate::aggregate::{self, AggregateOutcome};
use crate::definedness::{
    self, DefaultSemanticProvider, DefinednessBreakdown, DefinednessOverrides,
    ISemanticDefinedness,
};

/// Engine over one policy, one clock, and one semantic provider. Operators
/// never touch ambient state: each captures `now` once at entry and returns
/// a new state plus a record.
pub struct RefinementEngine {
    policy: Policy,
    clock: Arc<dyn IClock>,
    semantics: Arc<dyn ISemanticDefinedness>,
    overrides: DefinednessOverrides,
}

impl std::fmt::Debug for RefinementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefinementEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RefinementEngine {
    /// Engine with the default semantic provider. Fails on an invalid
    /// policy before anything else runs.
    pub fn new(policy: Policy, clock: Arc<dyn IClock>) -> NuanceResult<Self> {
        let policy = policy.validated()?;
        Ok(Self {
            policy,
            clock,
            semantics: Arc::new(DefaultSemanticProvider),
            overrides: DefinednessOverrides::none(),
        })
    }

    /// Swap in a semantic-definedness provider.
    pub fn with_semantics(mut self, semantics: Arc<dyn ISemanticDefinedness>) -> Self {
        self.semantics = semantics;
        self
    }

    /// Install definedness component overrides (calibration seam).
    pub fn with_overrides(mut self, overrides: DefinednessOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn clock(&self) -> &Arc<dyn IClock> {
        &self.clock
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn semantics(&self) -> &dyn ISemanticDefinedness {
        self.semantics.as_ref()
    }

    pub(crate) fn overrides(&self) -> &DefinednessOverrides {
        &self.overrides
    }

    /// Aggregate a state's evidence under the engine policy.
    pub(crate) fn aggregate_state(
        &self,
        state: &State,
        relevance: &RelevanceFn,
        now: DateTime<Utc>,
    ) -> AggregateOutcome {
        aggregate::aggregate(
            &state.evidence,
            &state.target,
            &state.context,
            &self.policy,
            relevance,
            now,
        )
    }

    /// Recompute `nu_raw` on a working state from a fresh aggregate, using
    /// the given overrides. Returns the aggregate and the breakdown so
    /// callers can reuse the conflict level and the provider-clamp flag.
    pub(crate) fn reassess(
        &self,
        state: &mut State,
        relevance: &RelevanceFn,
        overrides: &DefinednessOverrides,
        now: DateTime<Utc>,
    ) -> (AggregateOutcome, DefinednessBreakdown) {
        let agg = self.aggregate_state(state, relevance, now);
        let breakdown =
            definedness::assess(state, &agg, &self.policy, self.semantics(), overrides);
        state.nu_raw = breakdown.nu_raw;
        (agg, breakdown)
    }

    /// Invariant-check a candidate state and build its record. On violation
    /// the candidate is dropped and the caller's state stands.
    pub(crate) fn finish(
        &self,
        before: &State,
        after: State,
        operator: OperatorKind,
        at: DateTime<Utc>,
    ) -> NuanceResult<(State, RefinementRecord)> {
        invariants::check(&after)?;
        let record =
            RefinementRecord::between(before, &after, operator, at, self.policy.penalty_mode);
        Ok((after, record))
    }
}
