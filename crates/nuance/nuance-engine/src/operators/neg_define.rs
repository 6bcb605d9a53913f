//! NegDefine: narrow a target by stating what it is not, or which
//! boundaries it must satisfy. Constraints become definitional evidence and
//! deterministically raise the `constraint_coverage` tag.

use tracing::debug;

use nuance_core::constants::TAG_CONSTRAINT_COVERAGE;
use nuance_core::errors::NuanceResult;
use nuance_core::evidence::{Evidence, EvidenceKind};
use nuance_core::ids::AgentId;
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::State;

use crate::engine::RefinementEngine;

impl RefinementEngine {
    /// Add constraining definitions. Each constraint is synthesized as a
    /// definitional item (valence 0, trust 1) from `src`, or the sentinel
    /// system agent when no source is given. Duplicate constraints within
    /// the same time bucket dedup to one item and bump nothing twice.
    pub fn neg_define(
        &self,
        state: &State,
        constraints: &[String],
        src: Option<AgentId>,
    ) -> NuanceResult<(State, RefinementRecord)> {
        let now = self.now();
        let src = src.unwrap_or_else(AgentId::system);

        let mut next = state.clone();
        let mut accepted = Vec::new();
        for constraint in constraints {
            let item = Evidence::new(
                EvidenceKind::Definitional,
                constraint.clone(),
                0.0,
                src.clone(),
                now,
                1.0,
                self.policy().time_bucket_secs,
            );
            let id = item.id.clone();
            let (updated, ok) = next.evidence.insert(item);
            next.evidence = updated;
            if ok {
                accepted.push(id);
            }
        }

        let coverage = next.meta.tag_score(TAG_CONSTRAINT_COVERAGE, 0.0);
        let bumped = (coverage + self.policy().constraint_increment * accepted.len() as f64)
            .min(1.0);
        next.meta = next.meta.with_tag_score(TAG_CONSTRAINT_COVERAGE, bumped);

        self.reassess(&mut next, &self.policy().relevance, self.overrides(), now);

        next.meta.last_modified = now;
        next.meta
            .history
            .push(OperatorKind::NegDefine.as_str().to_string());

        debug!(
            target_id = %state.target,
            context_id = %state.context,
            constraints = accepted.len(),
            constraint_coverage = bumped,
            nu_raw = next.nu_raw,
            "constraints added"
        );

        let (next, record) = self.finish(state, next, OperatorKind::NegDefine, now)?;
        Ok((next, record.with_evidence_added(accepted)))
    }
}
