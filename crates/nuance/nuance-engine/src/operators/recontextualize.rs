//! Recontextualize: rebind a state to a new context, re-deriving each
//! item's trust from its stored pre-transform value under the destination's
//! role function.

use tracing::debug;

use nuance_core::context::Context;
use nuance_core::errors::{NuanceError, NuanceResult};
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::{Crossing, PenaltySource, State};

use crate::boundary;
use crate::engine::RefinementEngine;

impl RefinementEngine {
    /// Move a state from `from` to `to`. The evidence keeps its identities
    /// and claims; only trust changes. Expanding the governed scope adds a
    /// `ScopeExpansion` penalty proportional to the relative delta.
    pub fn recontextualize(
        &self,
        state: &State,
        from: &Context,
        to: &Context,
    ) -> NuanceResult<(State, RefinementRecord)> {
        if from.id != state.context {
            return Err(NuanceError::DomainMisuse {
                reason: format!(
                    "recontextualize from {} but state is bound to {}",
                    from.id, state.context
                ),
            });
        }
        if to.id == from.id {
            return Err(NuanceError::DomainMisuse {
                reason: format!("recontextualize to the identical context {}", to.id),
            });
        }

        let now = self.now();
        let policy = self.policy();

        let mut next = state.clone();
        next.context = to.id.clone();
        next.evidence = state.evidence.map_trust(|item| {
            let role = to.role_of(&item.src);
            (item.base_trust() * boundary::role_factor(role, policy)).clamp(0.0, 1.0)
        });

        next.meta.crossings.push(Crossing {
            from: from.id.clone(),
            to: to.id.clone(),
            at: now,
        });

        if to.scope.len() > from.scope.len() {
            let delta = (to.scope.len() - from.scope.len()) as f64;
            let ratio = delta / to.scope.len().max(1) as f64;
            let penalty = (policy.max_conflict_penalty * ratio).min(policy.max_conflict_penalty);
            let current = next.penalty(PenaltySource::ScopeExpansion);
            next.penalties
                .insert(PenaltySource::ScopeExpansion, current.max(penalty));
        }

        self.reassess(&mut next, &policy.relevance, self.overrides(), now);

        next.meta.last_modified = now;
        next.meta
            .history
            .push(OperatorKind::Recontextualize.as_str().to_string());

        debug!(
            target_id = %state.target,
            from = %from.id,
            to = %to.id,
            nu_raw = next.nu_raw,
            "state recontextualized"
        );

        let (next, record) = self.finish(state, next, OperatorKind::Recontextualize, now)?;
        let record = record.with_note(format!("{} -> {}", from.id, to.id));
        Ok((next, record))
    }
}
