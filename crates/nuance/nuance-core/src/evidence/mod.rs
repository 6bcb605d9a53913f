//! Evidence items and the insertion-ordered evidence set.
//!
//! Evidence ids are content-derived: two submissions of the same claim by
//! the same source within the same time bucket are the same observation.

pub mod set;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::BASE_TRUST_KEY;
use crate::errors::{NuanceError, NuanceResult};
use crate::ids::{AgentId, EvidenceId};

pub use set::{DedupMode, EvidenceSet};

/// The three disjoint evidence kinds. Epistemic items carry signed support
/// mass; definitional items feed semantic definedness; procedural items feed
/// procedural definedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Epistemic,
    Definitional,
    Procedural,
}

impl EvidenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceKind::Epistemic => "epistemic",
            EvidenceKind::Definitional => "definitional",
            EvidenceKind::Procedural => "procedural",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observation about a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    pub kind: EvidenceKind,
    pub claim: String,
    /// Signed support in [-1, 1]: positive affirms, negative opposes.
    pub valence: f64,
    pub src: AgentId,
    pub time: DateTime<Utc>,
    /// Trust in [0, 1]. After ingestion this is the boundary-adjusted value;
    /// the pre-transform trust lives under `metadata["base_trust"]`.
    pub trust: f64,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Bucket index for id derivation: observations inside the same bucket
/// collapse to one identity.
pub fn time_bucket(t: DateTime<Utc>, granularity_secs: i64) -> i64 {
    t.timestamp().div_euclid(granularity_secs.max(1))
}

/// Derive the deterministic evidence id from content identity.
pub fn derive_id(
    kind: EvidenceKind,
    claim: &str,
    src: &AgentId,
    time: DateTime<Utc>,
    granularity_secs: i64,
) -> EvidenceId {
    let bucket = time_bucket(time, granularity_secs);
    let raw = format!("{kind}:{claim}:{src}:{bucket}");
    let hash = blake3::hash(raw.as_bytes()).to_hex();
    EvidenceId(hash[..16].to_string())
}

impl Evidence {
    /// Build an item with a content-derived id.
    pub fn new(
        kind: EvidenceKind,
        claim: impl Into<String>,
        valence: f64,
        src: AgentId,
        time: DateTime<Utc>,
        trust: f64,
        granularity_secs: i64,
    ) -> Self {
        let claim = claim.into();
        let id = derive_id(kind, &claim, &src, time, granularity_secs);
        Self {
            id,
            kind,
            claim,
            valence,
            src,
            time,
            trust,
            metadata: BTreeMap::new(),
        }
    }

    /// Range-check valence and trust. Runs at operator entry so malformed
    /// items are rejected before any state is computed.
    pub fn validate(&self) -> NuanceResult<()> {
        if !self.valence.is_finite() || !(-1.0..=1.0).contains(&self.valence) {
            return Err(NuanceError::InvalidEvidence {
                id: self.id.0.clone(),
                reason: format!("valence {} outside [-1, 1]", self.valence),
            });
        }
        if !self.trust.is_finite() || !(0.0..=1.0).contains(&self.trust) {
            return Err(NuanceError::InvalidEvidence {
                id: self.id.0.clone(),
                reason: format!("trust {} outside [0, 1]", self.trust),
            });
        }
        Ok(())
    }

    /// The pre-boundary-transform trust. Falls back to the stored trust for
    /// items that never crossed a boundary.
    pub fn base_trust(&self) -> f64 {
        self.metadata
            .get(BASE_TRUST_KEY)
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(self.trust)
    }

    /// Record the pre-transform trust. Called once at ingestion, before the
    /// boundary transform rewrites `trust`.
    pub fn with_base_trust(mut self, base: f64) -> Self {
        self.metadata.insert(
            BASE_TRUST_KEY.to_string(),
            serde_json::Value::from(base),
        );
        self
    }

    /// Same item with a different trust value.
    pub fn with_trust(mut self, trust: f64) -> Self {
        self.trust = trust;
        self
    }
}
