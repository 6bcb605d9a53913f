//! Time-based refresh operators: Decay re-reads the evidence under the
//! current clock so age decay shows up in ν_raw; PenaltyDecay drives cleared
//! penalties toward zero on a quantized schedule.

use chrono::Duration;
use tracing::debug;

use nuance_core::constants::{PENALTY_DECAY_STEPS, PENALTY_PRUNE_THRESHOLD};
use nuance_core::errors::NuanceResult;
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::{PenaltySource, State};

use crate::engine::RefinementEngine;

impl RefinementEngine {
    /// Refresh a state's ν_raw so evidence age decay is reflected. Stored
    /// items are untouched; only their effective weight at aggregation
    /// changes.
    pub fn decay(&self, state: &State) -> NuanceResult<(State, RefinementRecord)> {
        let now = self.now();

        let mut next = state.clone();
        self.reassess(&mut next, &self.policy().relevance, self.overrides(), now);

        next.meta.last_modified = now;
        next.meta
            .history
            .push(OperatorKind::Decay.as_str().to_string());

        let delta = next.nu_raw - state.nu_raw;
        debug!(
            target_id = %state.target,
            context_id = %state.context,
            nu_raw_delta = delta,
            "evidence decay applied"
        );

        let (next, record) = self.finish(state, next, OperatorKind::Decay, now)?;
        let record = record.with_note(format!("nu_raw delta {delta:+.6}"));
        Ok((next, record))
    }

    /// Decay penalties. The conflict penalty decays only once its clear
    /// timer is running, in whole quantized steps of
    /// `penalty_clear_window / 24`; other sources decay by one geometric
    /// factor per invocation. Values at or below the prune threshold are
    /// removed. Disabled decay is a no-op (no history entry, no change).
    pub fn penalty_decay(&self, state: &State) -> NuanceResult<(State, RefinementRecord)> {
        let now = self.now();
        let policy = self.policy();

        if !policy.penalty_decay_enabled {
            return self.finish(state, state.clone(), OperatorKind::PenaltyDecay, now);
        }

        let mut next = state.clone();
        let step = Duration::seconds(policy.penalty_clear_window_secs / PENALTY_DECAY_STEPS);

        if let (Some(value), Some(clear_start)) = (
            next.penalties.get(&PenaltySource::Conflict).copied(),
            next.meta.penalty_clear_start,
        ) {
            let elapsed = now - clear_start;
            let steps = if step.num_seconds() > 0 {
                elapsed.num_seconds().max(0) / step.num_seconds()
            } else {
                0
            };
            if steps > 0 {
                let decayed = value * policy.penalty_decay_factor.powi(steps as i32);
                if decayed <= PENALTY_PRUNE_THRESHOLD {
                    next.penalties.remove(&PenaltySource::Conflict);
                    next.meta.penalty_clear_start = None;
                } else {
                    next.penalties.insert(PenaltySource::Conflict, decayed);
                    // Consume the whole steps so repeated invocations decay
                    // geometrically from the stored value, not from scratch.
                    next.meta.penalty_clear_start = Some(clear_start + step * steps as i32);
                }
            }
        }

        let others: Vec<PenaltySource> = next
            .penalties
            .keys()
            .copied()
            .filter(|s| *s != PenaltySource::Conflict)
            .collect();
        for source in others {
            let decayed = next.penalty(source) * policy.penalty_decay_factor;
            if decayed <= PENALTY_PRUNE_THRESHOLD {
                next.penalties.remove(&source);
            } else {
                next.penalties.insert(source, decayed);
            }
        }

        next.meta.last_modified = now;
        next.meta
            .history
            .push(OperatorKind::PenaltyDecay.as_str().to_string());

        debug!(
            target_id = %state.target,
            context_id = %state.context,
            remaining = next.penalties.len(),
            "penalties decayed"
        );

        self.finish(state, next, OperatorKind::PenaltyDecay, now)
    }
}
