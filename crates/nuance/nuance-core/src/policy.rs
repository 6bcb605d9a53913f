//! Refinement policy: thresholds, definedness weights, penalty and decay
//! parameters, boundary factors, and the pluggable relevance function.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{MASS_CURVE_K, WEIGHT_EPSILON};
use crate::errors::{NuanceError, NuanceResult};
use crate::evidence::{DedupMode, Evidence};
use crate::ids::{ContextId, TargetId};

/// Named policy defaults (π_default).
pub mod defaults {
    pub const THETA_EVAL: f64 = 0.4;
    pub const THETA_EVAL_RAW: f64 = 0.5;
    pub const THETA_NULL: f64 = 0.7;
    pub const THETA_DEFINED: f64 = 0.3;
    pub const THETA_CONFLICT: f64 = 0.3;
    pub const THETA_CONFLICT_CLEAR: f64 = 0.15;
    pub const W_SEM: f64 = 0.4;
    pub const W_EP: f64 = 0.35;
    pub const W_PROC: f64 = 0.25;
    pub const MAX_CONFLICT_PENALTY: f64 = 0.2;
    pub const CONFLICT_COOLDOWN_SECS: i64 = 3600;
    pub const PENALTY_DECAY_FACTOR: f64 = 0.9;
    pub const PENALTY_CLEAR_WINDOW_SECS: i64 = 86_400;
    pub const NOT_I_TRUST_FACTOR: f64 = 0.5;
    pub const COALITION_FACTOR: f64 = 0.75;
    pub const UNKNOWN_TRUST_FACTOR: f64 = 0.25;
    pub const TIME_BUCKET_SECS: i64 = 60;
    pub const EVIDENCE_HALF_LIFE_SECS: i64 = 86_400;
    pub const CONSTRAINT_INCREMENT: f64 = 0.1;
}

/// How multiple penalty sources combine into the single ν adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMode {
    /// Largest single penalty wins.
    #[default]
    Max,
    /// Penalties add, bounded at 1.0.
    Sum,
}

/// Mass-to-definedness curve for the epistemic and procedural components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum MassCurve {
    /// `1 - exp(-k * mass)`; the default k reads mass 2.0 as ≈ 0.85.
    Exponential { k: f64 },
    /// `min(1, mass / cap)`.
    Linear { cap: f64 },
}

impl MassCurve {
    pub fn apply(&self, mass: f64) -> f64 {
        if mass <= 0.0 {
            return 0.0;
        }
        match *self {
            MassCurve::Exponential { k } => 1.0 - (-k * mass).exp(),
            MassCurve::Linear { cap } => (mass / cap).min(1.0),
        }
    }
}

impl Default for MassCurve {
    fn default() -> Self {
        MassCurve::Exponential { k: MASS_CURVE_K }
    }
}

/// Pluggable evidence weighting `(evidence, target, context) → [0, 1]`.
/// Evaluation clamps the provider's output into range.
#[derive(Clone)]
pub struct RelevanceFn(Arc<dyn Fn(&Evidence, &TargetId, &ContextId) -> f64 + Send + Sync>);

impl RelevanceFn {
    pub fn new(f: impl Fn(&Evidence, &TargetId, &ContextId) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Weight every item the same.
    pub fn constant(value: f64) -> Self {
        Self::new(move |_, _, _| value)
    }

    pub fn eval(&self, evidence: &Evidence, target: &TargetId, context: &ContextId) -> f64 {
        (self.0)(evidence, target, context).clamp(0.0, 1.0)
    }
}

impl Default for RelevanceFn {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl fmt::Debug for RelevanceFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RelevanceFn")
    }
}

/// The refinement policy π. Construct with `Policy::default()` and adjust
/// fields; `validate` runs at engine construction and operator entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Total-ν licensing threshold.
    pub theta_eval: f64,
    /// Structural ν_raw licensing threshold.
    pub theta_eval_raw: f64,
    /// ν at or above this classifies as NULL.
    pub theta_null: f64,
    /// ν at or below this classifies as NOT_NULL.
    pub theta_defined: f64,
    /// Conflict level (inclusive) that triggers the conflict penalty.
    pub theta_conflict: f64,
    /// Conflict level (exclusive) below which penalty decay may start.
    pub theta_conflict_clear: f64,

    /// Definedness weights; must sum to 1.0.
    pub w_sem: f64,
    pub w_ep: f64,
    pub w_proc: f64,

    pub max_conflict_penalty: f64,
    /// Minimum spacing between conflict-penalty increases.
    pub conflict_cooldown_secs: i64,
    pub penalty_mode: PenaltyMode,
    pub penalty_decay_enabled: bool,
    /// Geometric factor applied per decay step.
    pub penalty_decay_factor: f64,
    /// Window over which a cleared conflict penalty is driven to zero.
    pub penalty_clear_window_secs: i64,

    /// Boundary-transform trust multipliers.
    pub not_i_trust_factor: f64,
    pub coalition_factor: f64,
    pub unknown_trust_factor: f64,

    pub dedup_mode: DedupMode,
    /// Granularity of evidence-id time bucketing.
    pub time_bucket_secs: i64,
    /// Half-life of evidence weight at aggregation time.
    pub evidence_half_life_secs: i64,
    pub mass_curve: MassCurve,
    /// Per-constraint bump to the `constraint_coverage` tag in NegDefine.
    pub constraint_increment: f64,

    #[serde(skip)]
    pub relevance: RelevanceFn,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            theta_eval: defaults::THETA_EVAL,
            theta_eval_raw: defaults::THETA_EVAL_RAW,
            theta_null: defaults::THETA_NULL,
            theta_defined: defaults::THETA_DEFINED,
            theta_conflict: defaults::THETA_CONFLICT,
            theta_conflict_clear: defaults::THETA_CONFLICT_CLEAR,
            w_sem: defaults::W_SEM,
            w_ep: defaults::W_EP,
            w_proc: defaults::W_PROC,
            max_conflict_penalty: defaults::MAX_CONFLICT_PENALTY,
            conflict_cooldown_secs: defaults::CONFLICT_COOLDOWN_SECS,
            penalty_mode: PenaltyMode::Max,
            penalty_decay_enabled: true,
            penalty_decay_factor: defaults::PENALTY_DECAY_FACTOR,
            penalty_clear_window_secs: defaults::PENALTY_CLEAR_WINDOW_SECS,
            not_i_trust_factor: defaults::NOT_I_TRUST_FACTOR,
            coalition_factor: defaults::COALITION_FACTOR,
            unknown_trust_factor: defaults::UNKNOWN_TRUST_FACTOR,
            dedup_mode: DedupMode::Strict,
            time_bucket_secs: defaults::TIME_BUCKET_SECS,
            evidence_half_life_secs: defaults::EVIDENCE_HALF_LIFE_SECS,
            mass_curve: MassCurve::default(),
            constraint_increment: defaults::CONSTRAINT_INCREMENT,
            relevance: RelevanceFn::default(),
        }
    }
}

impl Policy {
    /// Check every field's domain. The first offending field is named in the
    /// returned error.
    pub fn validate(&self) -> NuanceResult<()> {
        let unit_fields: [(&'static str, f64); 13] = [
            ("theta_eval", self.theta_eval),
            ("theta_eval_raw", self.theta_eval_raw),
            ("theta_null", self.theta_null),
            ("theta_defined", self.theta_defined),
            ("theta_conflict", self.theta_conflict),
            ("theta_conflict_clear", self.theta_conflict_clear),
            ("w_sem", self.w_sem),
            ("w_ep", self.w_ep),
            ("w_proc", self.w_proc),
            ("max_conflict_penalty", self.max_conflict_penalty),
            ("not_i_trust_factor", self.not_i_trust_factor),
            ("coalition_factor", self.coalition_factor),
            ("unknown_trust_factor", self.unknown_trust_factor),
        ];
        for (field, value) in unit_fields {
            check_unit(field, value)?;
        }

        let weight_sum = self.w_sem + self.w_ep + self.w_proc;
        if (weight_sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(NuanceError::InvalidPolicy {
                field: "w_sem + w_ep + w_proc",
                reason: format!("weights sum to {weight_sum}, expected 1.0"),
            });
        }

        let durations: [(&'static str, i64); 4] = [
            ("conflict_cooldown_secs", self.conflict_cooldown_secs),
            ("penalty_clear_window_secs", self.penalty_clear_window_secs),
            ("time_bucket_secs", self.time_bucket_secs),
            ("evidence_half_life_secs", self.evidence_half_life_secs),
        ];
        for (field, value) in durations {
            if value <= 0 {
                return Err(NuanceError::InvalidPolicy {
                    field,
                    reason: format!("duration {value}s is not positive"),
                });
            }
        }

        if !(self.penalty_decay_factor > 0.0 && self.penalty_decay_factor < 1.0) {
            return Err(NuanceError::InvalidPolicy {
                field: "penalty_decay_factor",
                reason: format!("{} outside (0, 1)", self.penalty_decay_factor),
            });
        }
        if !(self.constraint_increment > 0.0 && self.constraint_increment <= 1.0) {
            return Err(NuanceError::InvalidPolicy {
                field: "constraint_increment",
                reason: format!("{} outside (0, 1]", self.constraint_increment),
            });
        }
        match self.mass_curve {
            MassCurve::Exponential { k } if k <= 0.0 || !k.is_finite() => {
                return Err(NuanceError::InvalidPolicy {
                    field: "mass_curve",
                    reason: format!("exponential k {k} is not positive"),
                });
            }
            MassCurve::Linear { cap } if cap <= 0.0 || !cap.is_finite() => {
                return Err(NuanceError::InvalidPolicy {
                    field: "mass_curve",
                    reason: format!("linear cap {cap} is not positive"),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate-and-return, for construction pipelines.
    pub fn validated(self) -> NuanceResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

fn check_unit(field: &'static str, value: f64) -> NuanceResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(NuanceError::InvalidPolicy {
            field,
            reason: format!("{value} outside [0, 1]"),
        });
    }
    Ok(())
}
