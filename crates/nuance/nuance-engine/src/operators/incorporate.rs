//! Incorporate: ingest new evidence, recompute definedness, and run the
//! conflict evaluation inline.

use tracing::debug;

use nuance_core::context::Context;
use nuance_core::errors::{NuanceError, NuanceResult};
use nuance_core::evidence::Evidence;
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::State;

use crate::boundary;
use crate::engine::RefinementEngine;
use crate::operators::conflict;

impl RefinementEngine {
    /// Ingest `items` into a state under `context`'s boundary.
    ///
    /// Items are validated before any work happens; the boundary transform
    /// stamps each item's pre-transform trust and adjusts for the source's
    /// role; duplicates are rejected per the policy's dedup mode. The
    /// conflict evaluation runs at the end of the same transition (same
    /// `now`), so the cooldown stamp stays consistent without a second
    /// operator application.
    pub fn incorporate(
        &self,
        state: &State,
        context: &Context,
        items: Vec<Evidence>,
    ) -> NuanceResult<(State, RefinementRecord)> {
        if context.id != state.context {
            return Err(NuanceError::DomainMisuse {
                reason: format!(
                    "incorporate under context {} into state bound to {}",
                    context.id, state.context
                ),
            });
        }
        for item in &items {
            item.validate()?;
        }

        let now = self.now();
        let transformed = boundary::transform_all(items, context, self.policy());

        let mut next = state.clone();
        let mut accepted = Vec::new();
        for item in transformed {
            let id = item.id.clone();
            let (updated, ok) = next.evidence.insert(item);
            next.evidence = updated;
            if ok {
                accepted.push(id);
            } else {
                debug!(evidence_id = %id, "duplicate evidence rejected");
            }
        }

        let (agg, breakdown) =
            self.reassess(&mut next, &self.policy().relevance, self.overrides(), now);
        let outcome = conflict::evaluate(self, &mut next, agg.conflict, now);

        next.meta.last_modified = now;
        next.meta
            .history
            .push(OperatorKind::Incorporate.as_str().to_string());

        debug!(
            target_id = %state.target,
            context_id = %state.context,
            added = accepted.len(),
            nu_raw = next.nu_raw,
            conflict = agg.conflict,
            "evidence incorporated"
        );

        let (next, mut record) = self.finish(state, next, OperatorKind::Incorporate, now)?;
        record = record.with_evidence_added(accepted);
        if breakdown.provider_clamped {
            record = record.with_note("semantic provider output clamped into [0, 1]");
        }
        if outcome.applied {
            record = record.with_note(format!("conflict penalty applied at {:.3}", outcome.conflict));
        }
        Ok((next, record))
    }
}
