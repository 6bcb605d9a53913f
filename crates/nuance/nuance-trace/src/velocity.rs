//! Refinement velocity over record sequences and the system-health readout
//! over Σ.

use serde::{Deserialize, Serialize};

use nuance_core::policy::Policy;
use nuance_core::record::RefinementRecord;
use nuance_core::state::InformationState;
use nuance_engine::query::{is_licensed, null_status, NullStatus};

/// Per-step Δν between consecutive records.
pub fn velocities(records: &[RefinementRecord]) -> Vec<f64> {
    records
        .windows(2)
        .map(|w| w[1].nu_after - w[0].nu_after)
        .collect()
}

/// Per-step Δν_raw between consecutive records.
pub fn velocities_raw(records: &[RefinementRecord]) -> Vec<f64> {
    records
        .windows(2)
        .map(|w| w[1].nu_raw_after - w[0].nu_raw_after)
        .collect()
}

/// Mean Δν per step; zero for fewer than two records.
pub fn velocity_mean(records: &[RefinementRecord]) -> f64 {
    let v = velocities(records);
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Fraction of steps whose |Δν| falls below the threshold.
pub fn stuck_rate(records: &[RefinementRecord], threshold: f64) -> f64 {
    let v = velocities(records);
    if v.is_empty() {
        return 0.0;
    }
    let stuck = v.iter().filter(|d| d.abs() < threshold).count();
    stuck as f64 / v.len() as f64
}

/// Aggregate health over the whole information state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub total_targets: usize,
    pub licensed_count: usize,
    pub null_count: usize,
    pub mean_nu: f64,
    pub mean_nu_raw: f64,
    pub mean_velocity: f64,
    pub stuck_rate: f64,
}

impl SystemHealth {
    /// Compute the readout from Σ and a record stream; the stream supplies
    /// the velocity figures.
    pub fn measure(
        sigma: &InformationState,
        records: &[RefinementRecord],
        policy: &Policy,
        stuck_threshold: f64,
    ) -> Self {
        let total = sigma.len();
        let mut licensed = 0;
        let mut null = 0;
        let mut nu_sum = 0.0;
        let mut nu_raw_sum = 0.0;

        for state in sigma.states() {
            if is_licensed(state, policy) {
                licensed += 1;
            }
            if null_status(state, policy) == NullStatus::Null {
                null += 1;
            }
            nu_sum += state.nu(policy.penalty_mode);
            nu_raw_sum += state.nu_raw;
        }

        let denom = total.max(1) as f64;
        Self {
            total_targets: total,
            licensed_count: licensed,
            null_count: null,
            mean_nu: nu_sum / denom,
            mean_nu_raw: nu_raw_sum / denom,
            mean_velocity: velocity_mean(records),
            stuck_rate: stuck_rate(records, stuck_threshold),
        }
    }

    pub fn licensed_fraction(&self) -> f64 {
        if self.total_targets == 0 {
            return 0.0;
        }
        self.licensed_count as f64 / self.total_targets as f64
    }

    /// Lower is better: mean ν across the tracked pairs.
    pub fn health_score(&self) -> f64 {
        self.mean_nu
    }
}
