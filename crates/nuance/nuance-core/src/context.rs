//! Refinement contexts: agent sides, role resolution, time window, scope.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, ContextId, TargetId};

/// An agent's stance relative to a context boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    I,
    NotI,
    Both,
    Unknown,
}

/// A scope of refinement: who is inside the boundary, when the context is
/// live, and which targets it governs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    #[serde(default)]
    pub i_side: BTreeSet<AgentId>,
    #[serde(default)]
    pub not_i_side: BTreeSet<AgentId>,
    /// Half-open window [start, end); `None` end means unbounded.
    pub window_start: DateTime<Utc>,
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scope: BTreeSet<TargetId>,
    /// Explicit role assignments; these win over side-set membership.
    #[serde(default)]
    pub roles: BTreeMap<AgentId, Role>,
}

impl Context {
    /// Context with the given id, open window, empty sides and scope.
    pub fn new(id: impl Into<ContextId>) -> Self {
        Self {
            id: id.into(),
            i_side: BTreeSet::new(),
            not_i_side: BTreeSet::new(),
            window_start: DateTime::<Utc>::UNIX_EPOCH,
            window_end: None,
            scope: BTreeSet::new(),
            roles: BTreeMap::new(),
        }
    }

    /// Resolve an agent's role: explicit assignment first, then side-set
    /// membership (both sides → `Both`), else `Unknown`.
    pub fn role_of(&self, agent: &AgentId) -> Role {
        if let Some(role) = self.roles.get(agent) {
            return *role;
        }
        match (self.i_side.contains(agent), self.not_i_side.contains(agent)) {
            (true, true) => Role::Both,
            (true, false) => Role::I,
            (false, true) => Role::NotI,
            (false, false) => Role::Unknown,
        }
    }

    /// Whether an instant falls inside the half-open window.
    pub fn covers(&self, t: DateTime<Utc>) -> bool {
        t >= self.window_start && self.window_end.map_or(true, |end| t < end)
    }
}
