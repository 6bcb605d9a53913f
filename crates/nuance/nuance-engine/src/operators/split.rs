//! Split: derive child targets from a parent state. Children copy the
//! parent's evidence, start with no penalties, and score under their own
//! relevance function.

use serde_json::Value;
use tracing::debug;

use nuance_core::constants::{TAG_RELEVANCE_OVERRIDE, TAG_SPLIT_PARENT};
use nuance_core::errors::{NuanceError, NuanceResult};
use nuance_core::ids::TargetId;
use nuance_core::policy::RelevanceFn;
use nuance_core::record::{OperatorKind, RefinementRecord};
use nuance_core::state::{State, StateMeta};

use crate::definedness::DefinednessOverrides;
use crate::engine::RefinementEngine;

/// One child of a split.
#[derive(Clone)]
pub struct ChildSpec {
    pub target: TargetId,
    /// Child-specific evidence weighting; `None` inherits the policy's.
    pub relevance: Option<RelevanceFn>,
    /// Child-specific definedness hooks; `None` inherits the engine's.
    pub overrides: Option<DefinednessOverrides>,
}

impl ChildSpec {
    pub fn new(target: impl Into<TargetId>) -> Self {
        Self {
            target: target.into(),
            relevance: None,
            overrides: None,
        }
    }

    pub fn with_relevance(mut self, relevance: RelevanceFn) -> Self {
        self.relevance = Some(relevance);
        self
    }

    pub fn with_overrides(mut self, overrides: DefinednessOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

impl RefinementEngine {
    /// Split a parent into one state per child spec. Each child receives a
    /// copy of the parent's evidence (not a partition), an empty penalty
    /// map, and a history seeded with a split marker naming the parent.
    pub fn split(
        &self,
        parent: &State,
        specs: &[ChildSpec],
    ) -> NuanceResult<(Vec<State>, Vec<RefinementRecord>)> {
        if specs.is_empty() {
            return Err(NuanceError::DomainMisuse {
                reason: format!("split of {} with zero children", parent.target),
            });
        }

        let now = self.now();
        let mut children = Vec::with_capacity(specs.len());
        let mut records = Vec::with_capacity(specs.len());

        for spec in specs {
            let mut tags = parent.meta.tags.clone();
            tags.insert(
                TAG_SPLIT_PARENT.to_string(),
                Value::from(parent.target.0.clone()),
            );
            tags.insert(
                TAG_RELEVANCE_OVERRIDE.to_string(),
                Value::from(spec.relevance.is_some()),
            );

            let mut child = State {
                target: spec.target.clone(),
                context: parent.context.clone(),
                nu_raw: 1.0,
                penalties: Default::default(),
                evidence: parent.evidence.clone(),
                meta: StateMeta {
                    created: now,
                    last_modified: now,
                    history: vec![format!("split:{}", parent.target)],
                    crossings: Vec::new(),
                    conflict_last_applied: None,
                    penalty_clear_start: None,
                    tags,
                },
            };

            let relevance = spec
                .relevance
                .as_ref()
                .unwrap_or(&self.policy().relevance);
            let overrides = spec.overrides.as_ref().unwrap_or(self.overrides());
            self.reassess(&mut child, relevance, overrides, now);

            debug!(
                parent = %parent.target,
                child = %child.target,
                nu_raw = child.nu_raw,
                "child split off"
            );

            let (child, record) = self.finish(parent, child, OperatorKind::Split, now)?;
            let record = record.with_note(format!("child of {}", parent.target));
            children.push(child);
            records.push(record);
        }

        Ok((children, records))
    }
}
