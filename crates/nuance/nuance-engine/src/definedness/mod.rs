//! Definedness assessment: `Def = w_sem·Def_sem + w_ep·Def_ep +
//! w_proc·Def_proc`, `ν_raw = 1 − Def`.
//!
//! Def_sem comes from the pluggable semantic provider; Def_ep and Def_proc
//! come from the aggregation outcome. Optional override hooks replace any
//! component; this is the calibration seam the scenario tests rely on.

pub mod provider;

use std::sync::Arc;

use tracing::warn;

use nuance_core::policy::Policy;
use nuance_core::state::State;

use crate::aggregate::AggregateOutcome;

pub use provider::{DefaultSemanticProvider, ISemanticDefinedness};

/// Override for the semantic component.
pub type DefSemFn = Arc<dyn Fn(&State) -> f64 + Send + Sync>;
/// Override for a mass-derived component.
pub type DefMassFn = Arc<dyn Fn(&AggregateOutcome) -> f64 + Send + Sync>;

/// Optional component overrides. `None` means the default path: the
/// semantic provider for Def_sem, the aggregation curve for the rest.
#[derive(Clone, Default)]
pub struct DefinednessOverrides {
    pub def_sem: Option<DefSemFn>,
    pub def_ep: Option<DefMassFn>,
    pub def_proc: Option<DefMassFn>,
}

impl DefinednessOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_def_sem(mut self, f: impl Fn(&State) -> f64 + Send + Sync + 'static) -> Self {
        self.def_sem = Some(Arc::new(f));
        self
    }

    pub fn with_def_ep(
        mut self,
        f: impl Fn(&AggregateOutcome) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.def_ep = Some(Arc::new(f));
        self
    }

    pub fn with_def_proc(
        mut self,
        f: impl Fn(&AggregateOutcome) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.def_proc = Some(Arc::new(f));
        self
    }
}

/// Component scores plus the combined result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefinednessBreakdown {
    pub def_sem: f64,
    pub def_ep: f64,
    pub def_proc: f64,
    pub def_total: f64,
    pub nu_raw: f64,
    /// Whether the semantic provider's output had to be clamped into [0, 1].
    pub provider_clamped: bool,
}

/// Assess a state's definedness from the provider and an aggregation
/// outcome. Out-of-range provider output is clamped and flagged, never
/// fatal.
pub fn assess(
    state: &State,
    agg: &AggregateOutcome,
    policy: &Policy,
    semantics: &dyn ISemanticDefinedness,
    overrides: &DefinednessOverrides,
) -> DefinednessBreakdown {
    let raw_sem = match &overrides.def_sem {
        Some(f) => f(state),
        None => semantics.semantic_definedness(state, &state.context),
    };
    let provider_clamped = !raw_sem.is_finite() || !(0.0..=1.0).contains(&raw_sem);
    let def_sem = if raw_sem.is_finite() {
        raw_sem.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if provider_clamped {
        warn!(
            target_id = %state.target,
            context_id = %state.context,
            value = raw_sem,
            "semantic definedness out of range, clamped"
        );
    }

    let def_ep = match &overrides.def_ep {
        Some(f) => f(agg).clamp(0.0, 1.0),
        None => agg.def_ep,
    };
    let def_proc = match &overrides.def_proc {
        Some(f) => f(agg).clamp(0.0, 1.0),
        None => agg.def_proc,
    };

    let def_total =
        (policy.w_sem * def_sem + policy.w_ep * def_ep + policy.w_proc * def_proc).clamp(0.0, 1.0);

    DefinednessBreakdown {
        def_sem,
        def_ep,
        def_proc,
        def_total,
        nu_raw: (1.0 - def_total).clamp(0.0, 1.0),
        provider_clamped,
    }
}
