//! Conflict detection and penalty application.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use nuance_core::errors::NuanceResult;
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::{PenaltySource, State};

use crate::engine::RefinementEngine;

/// What one conflict evaluation did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ConflictOutcome {
    pub conflict: f64,
    /// The penalty was set (or refreshed) this evaluation.
    pub applied: bool,
    /// The decay timer was started this evaluation.
    pub clear_started: bool,
}

/// Shared conflict-penalty logic, applied to a working state. Used by the
/// explicit Conflict operator and by Incorporate's automatic step, so the
/// cooldown invariant holds on both paths.
pub(crate) fn evaluate(
    engine: &RefinementEngine,
    state: &mut State,
    conflict: f64,
    now: DateTime<Utc>,
) -> ConflictOutcome {
    let policy = engine.policy();
    let mut outcome = ConflictOutcome {
        conflict,
        applied: false,
        clear_started: false,
    };

    if conflict >= policy.theta_conflict {
        let in_cooldown = state.meta.conflict_last_applied.is_some_and(|last| {
            now - last < Duration::seconds(policy.conflict_cooldown_secs)
        });
        if !in_cooldown {
            let penalty = (conflict * policy.max_conflict_penalty)
                .min(policy.max_conflict_penalty);
            state.penalties.insert(PenaltySource::Conflict, penalty);
            state.meta.conflict_last_applied = Some(now);
            state.meta.penalty_clear_start = None;
            outcome.applied = true;
        }
    } else if conflict < policy.theta_conflict_clear
        && state.penalties.contains_key(&PenaltySource::Conflict)
        && state.meta.penalty_clear_start.is_none()
    {
        state.meta.penalty_clear_start = Some(now);
        outcome.clear_started = true;
    }

    outcome
}

impl RefinementEngine {
    /// Recompute the conflict level from the current aggregate and apply or
    /// release the conflict penalty under the cooldown discipline.
    pub fn conflict(&self, state: &State) -> NuanceResult<(State, RefinementRecord)> {
        let now = self.now();
        let agg = self.aggregate_state(state, &self.policy().relevance, now);

        let mut next = state.clone();
        let outcome = evaluate(self, &mut next, agg.conflict, now);

        debug!(
            target_id = %state.target,
            context_id = %state.context,
            conflict = agg.conflict,
            applied = outcome.applied,
            "conflict evaluated"
        );

        next.meta.last_modified = now;
        next.meta
            .history
            .push(OperatorKind::Conflict.as_str().to_string());

        let (next, record) = self.finish(state, next, OperatorKind::Conflict, now)?;
        let record = record.with_note(format!(
            "conflict={:.3} pos_mass={:.3} neg_mass={:.3}",
            agg.conflict, agg.pos_mass, agg.neg_mass
        ));
        Ok((next, record))
    }
}
