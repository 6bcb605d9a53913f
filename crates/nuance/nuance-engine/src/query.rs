//! Licensing evaluation and refinement-priority ranking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use nuance_core::ids::{ContextId, TargetId};
use nuance_core::policy::Policy;
use nuance_core::state::{InformationState, PenaltySource, State};

/// Why a state is, or is not, licensed for truth evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseReason {
    /// Both thresholds hold.
    Licensed,
    /// ν_raw exceeds the structural threshold, regardless of ν.
    StructurallyVague,
    /// Structurally clear, but penalties push ν over the total threshold.
    PenaltyBlock,
    /// ν at or above θ_null; shadows every other reason.
    NullClassified,
}

/// Coarse null classification of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullStatus {
    Null,
    NotNull,
    Indeterminate,
}

/// Full licensing readout for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub target: TargetId,
    pub context: ContextId,
    pub licensed: bool,
    pub reason: LicenseReason,
    pub null_status: NullStatus,
    pub nu: f64,
    pub nu_raw: f64,
    pub penalties: BTreeMap<PenaltySource, f64>,
}

/// Truth evaluation is licensed iff `ν_raw ≤ θ_eval_raw` and `ν ≤ θ_eval`.
/// The pair distinguishes structural vagueness from penalty blockage.
pub fn is_licensed(state: &State, policy: &Policy) -> bool {
    let nu = state.nu(policy.penalty_mode);
    state.nu_raw <= policy.theta_eval_raw && nu <= policy.theta_eval
}

/// The reason behind the licensing verdict. `NullClassified` shadows the
/// threshold reasons.
pub fn license_reason(state: &State, policy: &Policy) -> LicenseReason {
    let nu = state.nu(policy.penalty_mode);
    if nu >= policy.theta_null {
        LicenseReason::NullClassified
    } else if state.nu_raw > policy.theta_eval_raw {
        LicenseReason::StructurallyVague
    } else if nu > policy.theta_eval {
        LicenseReason::PenaltyBlock
    } else {
        LicenseReason::Licensed
    }
}

pub fn null_status(state: &State, policy: &Policy) -> NullStatus {
    let nu = state.nu(policy.penalty_mode);
    if nu >= policy.theta_null {
        NullStatus::Null
    } else if nu <= policy.theta_defined {
        NullStatus::NotNull
    } else {
        NullStatus::Indeterminate
    }
}

/// Evaluate one state against the policy thresholds.
pub fn query(state: &State, policy: &Policy) -> QueryResponse {
    QueryResponse {
        target: state.target.clone(),
        context: state.context.clone(),
        licensed: is_licensed(state, policy),
        reason: license_reason(state, policy),
        null_status: null_status(state, policy),
        nu: state.nu(policy.penalty_mode),
        nu_raw: state.nu_raw,
        penalties: state.penalties.clone(),
    }
}

/// Rank every (target, context) pair in Σ by refinement priority: most
/// vague first (ν descending), then ν_raw descending, then oldest
/// last-modified first.
pub fn query_next(sigma: &InformationState, policy: &Policy) -> Vec<(TargetId, ContextId)> {
    let mut ranked: Vec<&State> = sigma.states().collect();
    ranked.sort_by(|a, b| {
        let nu_a = a.nu(policy.penalty_mode);
        let nu_b = b.nu(policy.penalty_mode);
        nu_b.total_cmp(&nu_a)
            .then(b.nu_raw.total_cmp(&a.nu_raw))
            .then(a.meta.last_modified.cmp(&b.meta.last_modified))
    });
    ranked
        .into_iter()
        .map(|s| (s.target.clone(), s.context.clone()))
        .collect()
}
