//! Σ, the global (target, context) → state mapping.
//!
//! Σ is a value the host holds. Replacement is pure: `with_state` returns a
//! new mapping, so hosts can swap references for safe concurrent reads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ContextId, TargetId};
use crate::state::State;

/// Ordered mapping from (target, context) to state. Absent entries default
/// conceptually to `State::initial`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InformationState {
    states: BTreeMap<(TargetId, ContextId), State>,
}

impl InformationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, target: &TargetId, context: &ContextId) -> bool {
        self.states
            .contains_key(&(target.clone(), context.clone()))
    }

    pub fn get(&self, target: &TargetId, context: &ContextId) -> Option<&State> {
        self.states.get(&(target.clone(), context.clone()))
    }

    /// The stored state, or a fresh initial state for an untouched pair.
    pub fn state_or_initial(
        &self,
        target: &TargetId,
        context: &ContextId,
        now: DateTime<Utc>,
    ) -> State {
        self.get(target, context)
            .cloned()
            .unwrap_or_else(|| State::initial(target.clone(), context.clone(), now))
    }

    /// New Σ with the given state bound under its own (target, context) key.
    pub fn with_state(&self, state: State) -> Self {
        let mut next = self.clone();
        next.states
            .insert((state.target.clone(), state.context.clone()), state);
        next
    }

    /// New Σ without the given pair. Reclaiming orphans is a host decision.
    pub fn without(&self, target: &TargetId, context: &ContextId) -> Self {
        let mut next = self.clone();
        next.states.remove(&(target.clone(), context.clone()));
        next
    }

    pub fn keys(&self) -> impl Iterator<Item = &(TargetId, ContextId)> {
        self.states.keys()
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }
}
