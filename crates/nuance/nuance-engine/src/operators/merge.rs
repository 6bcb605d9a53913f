//! Merge: union two states tracking the same target.

use tracing::debug;

use nuance_core::errors::{NuanceError, NuanceResult};
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::{PenaltySource, State, StateMeta};

use crate::engine::RefinementEngine;

impl RefinementEngine {
    /// Merge `b` into `a`. The result is bound to `a`'s (target, context);
    /// evidence is unioned, tags are unioned with `a` winning key conflicts,
    /// and the histories are concatenated around a merge marker.
    ///
    /// A `MergeRupture` penalty is added only when the union exhibits
    /// conflict above the trigger threshold that neither parent exhibited on
    /// its own.
    pub fn merge(&self, a: &State, b: &State) -> NuanceResult<(State, RefinementRecord)> {
        if a.target != b.target {
            return Err(NuanceError::DomainMisuse {
                reason: format!("merge of differing targets {} and {}", a.target, b.target),
            });
        }

        let now = self.now();
        let relevance = &self.policy().relevance;
        let agg_a = self.aggregate_state(a, relevance, now);
        let agg_b = self.aggregate_state(b, relevance, now);

        let mut tags = b.meta.tags.clone();
        tags.extend(a.meta.tags.clone());

        let mut history = a.meta.history.clone();
        history.push(format!("merge:{}@{}+{}@{}", a.target, a.context, b.target, b.context));
        history.extend(b.meta.history.iter().cloned());

        let mut crossings = a.meta.crossings.clone();
        crossings.extend(b.meta.crossings.iter().cloned());

        let mut next = State {
            target: a.target.clone(),
            context: a.context.clone(),
            nu_raw: 1.0,
            penalties: Default::default(),
            evidence: a.evidence.union(&b.evidence),
            meta: StateMeta {
                created: now,
                last_modified: now,
                history,
                crossings,
                conflict_last_applied: None,
                penalty_clear_start: None,
                tags,
            },
        };

        let (agg, _) = self.reassess(&mut next, relevance, self.overrides(), now);

        let emergent = agg.conflict > self.policy().theta_conflict
            && agg_a.conflict <= self.policy().theta_conflict
            && agg_b.conflict <= self.policy().theta_conflict;
        if emergent {
            let penalty = (agg.conflict * self.policy().max_conflict_penalty)
                .min(self.policy().max_conflict_penalty);
            next.penalties.insert(PenaltySource::MergeRupture, penalty);
        }

        debug!(
            target_id = %a.target,
            context_id = %a.context,
            merged_evidence = next.evidence.len(),
            conflict = agg.conflict,
            rupture = emergent,
            "states merged"
        );

        let (next, record) = self.finish(a, next, OperatorKind::Merge, now)?;
        let record = record.with_note(format!("merged with {}@{}", b.target, b.context));
        Ok((next, record))
    }
}
