//! Evidence aggregation: signed support masses, conflict level, and the
//! mass-derived definedness components.

use chrono::{DateTime, Utc};

use nuance_core::evidence::{EvidenceKind, EvidenceSet};
use nuance_core::ids::{ContextId, TargetId};
use nuance_core::policy::{Policy, RelevanceFn};

/// Aggregation readout over one evidence set at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOutcome {
    /// Supporting epistemic mass.
    pub pos_mass: f64,
    /// Opposing epistemic mass.
    pub neg_mass: f64,
    /// Conflict level in [0, 1]; 1 = perfectly balanced opposition.
    pub conflict: f64,
    /// Epistemic definedness from total signed mass.
    pub def_ep: f64,
    /// Procedural definedness from procedural mass.
    pub def_proc: f64,
}

/// `2 · min(pos, neg) / (pos + neg)`, zero on empty mass.
pub fn compute_conflict(pos_mass: f64, neg_mass: f64) -> f64 {
    let total = pos_mass + neg_mass;
    if total <= 0.0 {
        return 0.0;
    }
    2.0 * pos_mass.min(neg_mass) / total
}

/// Half-life weight decay: 1.0 at age zero, 0.5 after one half-life.
/// Negative ages (items stamped ahead of `now`) read as fresh.
pub fn age_decay(age_secs: i64, half_life_secs: i64) -> f64 {
    if age_secs <= 0 {
        return 1.0;
    }
    let exponent = age_secs as f64 / half_life_secs.max(1) as f64;
    0.5_f64.powf(exponent)
}

/// Aggregate an evidence set for one (target, context) pair.
///
/// Per epistemic item the effective weight is
/// `trust · relevance(e, target, context) · age_decay(now − e.time)`; the
/// signed contribution `valence · weight` accumulates into the positive or
/// negative mass. Procedural items feed only the procedural mass;
/// definitional items feed neither (they reach definedness through the
/// semantic provider). Items with zero relevance are skipped.
pub fn aggregate(
    evidence: &EvidenceSet,
    target: &TargetId,
    context: &ContextId,
    policy: &Policy,
    relevance: &RelevanceFn,
    now: DateTime<Utc>,
) -> AggregateOutcome {
    let mut pos_mass = 0.0;
    let mut neg_mass = 0.0;
    let mut proc_mass = 0.0;

    for item in evidence.iter() {
        let rel = relevance.eval(item, target, context);
        if rel <= 0.0 {
            continue;
        }
        let age = (now - item.time).num_seconds();
        let weight = item.trust * rel * age_decay(age, policy.evidence_half_life_secs);

        match item.kind {
            EvidenceKind::Epistemic => {
                let signed = item.valence * weight;
                if signed >= 0.0 {
                    pos_mass += signed;
                } else {
                    neg_mass += -signed;
                }
            }
            EvidenceKind::Procedural => {
                proc_mass += item.valence.abs() * weight;
            }
            EvidenceKind::Definitional => {}
        }
    }

    AggregateOutcome {
        pos_mass,
        neg_mass,
        conflict: compute_conflict(pos_mass, neg_mass),
        def_ep: policy.mass_curve.apply(pos_mass + neg_mass),
        def_proc: policy.mass_curve.apply(proc_mass),
    }
}
