//! Refinement records: the per-operator provenance entry returned alongside
//! every new state. Records carry scores by value and never reference state
//! objects.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ContextId, EvidenceId, TargetId};
use crate::policy::PenaltyMode;
use crate::state::{PenaltySource, State};

/// The closed set of state-transforming operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Incorporate,
    NegDefine,
    Merge,
    Recontextualize,
    Conflict,
    PenaltyDecay,
    Split,
    Decay,
}

impl OperatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Incorporate => "incorporate",
            OperatorKind::NegDefine => "neg_define",
            OperatorKind::Merge => "merge",
            OperatorKind::Recontextualize => "recontextualize",
            OperatorKind::Conflict => "conflict",
            OperatorKind::PenaltyDecay => "penalty_decay",
            OperatorKind::Split => "split",
            OperatorKind::Decay => "decay",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one operator application did to one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementRecord {
    pub target: TargetId,
    pub context: ContextId,
    pub operator: OperatorKind,
    pub at: DateTime<Utc>,
    pub nu_raw_before: f64,
    pub nu_raw_after: f64,
    pub nu_before: f64,
    pub nu_after: f64,
    /// Per-source penalty change (after − before); only nonzero entries.
    #[serde(default)]
    pub penalties_delta: BTreeMap<PenaltySource, f64>,
    /// Ids of evidence items the operator actually inserted.
    #[serde(default)]
    pub evidence_added: Vec<EvidenceId>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl RefinementRecord {
    /// Build the record for a before → after transition.
    pub fn between(
        before: &State,
        after: &State,
        operator: OperatorKind,
        at: DateTime<Utc>,
        mode: PenaltyMode,
    ) -> Self {
        let mut penalties_delta = BTreeMap::new();
        let sources = [
            PenaltySource::Conflict,
            PenaltySource::ScopeExpansion,
            PenaltySource::MergeRupture,
            PenaltySource::CategoryError,
            PenaltySource::Manual,
        ];
        for source in sources {
            let delta = after.penalty(source) - before.penalty(source);
            if delta != 0.0 {
                penalties_delta.insert(source, delta);
            }
        }
        Self {
            target: after.target.clone(),
            context: after.context.clone(),
            operator,
            at,
            nu_raw_before: before.nu_raw,
            nu_raw_after: after.nu_raw,
            nu_before: before.nu(mode),
            nu_after: after.nu(mode),
            penalties_delta,
            evidence_added: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_evidence_added(mut self, ids: Vec<EvidenceId>) -> Self {
        self.evidence_added = ids;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
