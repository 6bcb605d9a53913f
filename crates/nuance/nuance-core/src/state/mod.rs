//! Per-(target, context) state and the global information state Σ.
//!
//! States are values: operators read a state and return a new one. ν is
//! never stored; it is derived from `nu_raw` and the penalty map on every
//! read.

pub mod invariants;
pub mod sigma;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::EvidenceSet;
use crate::ids::{ContextId, TargetId};
use crate::policy::PenaltyMode;

pub use sigma::InformationState;

/// The closed set of situational penalty sources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PenaltySource {
    Conflict,
    ScopeExpansion,
    MergeRupture,
    CategoryError,
    Manual,
}

impl PenaltySource {
    pub fn as_str(self) -> &'static str {
        match self {
            PenaltySource::Conflict => "conflict",
            PenaltySource::ScopeExpansion => "scope_expansion",
            PenaltySource::MergeRupture => "merge_rupture",
            PenaltySource::CategoryError => "category_error",
            PenaltySource::Manual => "manual",
        }
    }
}

impl fmt::Display for PenaltySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded context crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub from: ContextId,
    pub to: ContextId,
    pub at: DateTime<Utc>,
}

/// Bookkeeping attached to a state. Unknown fields in persisted metadata are
/// ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMeta {
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// One entry per mutating operator application, in order.
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub crossings: Vec<Crossing>,
    /// Timestamp of the most recent conflict-penalty increase.
    #[serde(default)]
    pub conflict_last_applied: Option<DateTime<Utc>>,
    /// When the conflict level was first observed below the clear threshold.
    #[serde(default)]
    pub penalty_clear_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: BTreeMap<String, serde_json::Value>,
}

impl StateMeta {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            created: now,
            last_modified: now,
            history: Vec::new(),
            crossings: Vec::new(),
            conflict_last_applied: None,
            penalty_clear_start: None,
            tags: BTreeMap::new(),
        }
    }

    /// Numeric tag readout with a fallback for absent keys.
    pub fn tag_score(&self, key: &str, default: f64) -> f64 {
        self.tags
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(default)
    }

    /// Set a numeric tag, returning the updated metadata.
    pub fn with_tag_score(mut self, key: &str, value: f64) -> Self {
        self.tags
            .insert(key.to_string(), serde_json::Value::from(value));
        self
    }
}

/// Definedness state for one (target, context) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub target: TargetId,
    pub context: ContextId,
    /// Structural vagueness, `1 − Def`, in [0, 1].
    pub nu_raw: f64,
    /// Situational penalty contributions, each in [0, 1]. Absent key = 0.
    #[serde(default)]
    pub penalties: BTreeMap<PenaltySource, f64>,
    pub evidence: EvidenceSet,
    pub meta: StateMeta,
}

impl State {
    /// The initial state for a pair nothing has touched yet: maximally vague,
    /// no penalties, no evidence.
    pub fn initial(target: TargetId, context: ContextId, now: DateTime<Utc>) -> Self {
        Self {
            target,
            context,
            nu_raw: 1.0,
            penalties: BTreeMap::new(),
            evidence: EvidenceSet::empty(),
            meta: StateMeta::at(now),
        }
    }

    /// The single penalty adjustment under the given combination mode.
    pub fn combined_penalty(&self, mode: PenaltyMode) -> f64 {
        if self.penalties.is_empty() {
            return 0.0;
        }
        match mode {
            PenaltyMode::Max => self
                .penalties
                .values()
                .copied()
                .fold(0.0, f64::max),
            PenaltyMode::Sum => self.penalties.values().sum::<f64>().min(1.0),
        }
    }

    /// Derived ν: `clamp(nu_raw + combined_penalty, 0, 1)`.
    pub fn nu(&self, mode: PenaltyMode) -> f64 {
        (self.nu_raw + self.combined_penalty(mode)).clamp(0.0, 1.0)
    }

    /// A single source's contribution; absent key reads as zero.
    pub fn penalty(&self, source: PenaltySource) -> f64 {
        self.penalties.get(&source).copied().unwrap_or(0.0)
    }
}
