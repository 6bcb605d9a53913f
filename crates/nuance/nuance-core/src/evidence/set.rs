//! Insertion-ordered evidence collection with set-level deduplication.

use serde::{Deserialize, Serialize};

use super::{Evidence, EvidenceKind};
use crate::ids::EvidenceId;

/// How an insert treats an item whose derived id already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Reject any item whose id is already present.
    #[default]
    Strict,
    /// Retain duplicates when the source differs; same-source re-submissions
    /// are always rejected.
    Corroboration,
}

/// Evidence keyed by content-derived id. Iteration order is insertion order
/// so aggregation is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvidenceSet {
    items: Vec<Evidence>,
    #[serde(default)]
    mode: DedupMode,
}

impl EvidenceSet {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            items: Vec::new(),
            mode,
        }
    }

    /// Empty set under strict dedup.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Evidence> {
        self.items.iter()
    }

    pub fn contains(&self, id: &EvidenceId) -> bool {
        self.items.iter().any(|e| &e.id == id)
    }

    /// Whether an insert of `candidate` would be accepted under this set's
    /// dedup mode.
    pub fn accepts(&self, candidate: &Evidence) -> bool {
        for existing in &self.items {
            if existing.id == candidate.id {
                match self.mode {
                    DedupMode::Strict => return false,
                    DedupMode::Corroboration => {
                        if existing.src == candidate.src {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Insert one item, returning the new set and whether it was accepted.
    /// Rejected duplicates leave the set unchanged.
    pub fn insert(&self, item: Evidence) -> (Self, bool) {
        if !self.accepts(&item) {
            return (self.clone(), false);
        }
        let mut next = self.clone();
        next.items.push(item);
        (next, true)
    }

    /// Union keyed by id: items of `self` first, then items of `other` whose
    /// id is not yet present.
    pub fn union(&self, other: &Self) -> Self {
        let mut next = self.clone();
        for item in &other.items {
            if !next.contains(&item.id) {
                next.items.push(item.clone());
            }
        }
        next
    }

    /// Retain items matching the predicate, preserving order and mode.
    pub fn filter(&self, pred: impl Fn(&Evidence) -> bool) -> Self {
        Self {
            items: self.items.iter().filter(|e| pred(e)).cloned().collect(),
            mode: self.mode,
        }
    }

    pub fn by_kind(&self, kind: EvidenceKind) -> impl Iterator<Item = &Evidence> {
        self.items.iter().filter(move |e| e.kind == kind)
    }

    /// Same items under a different trust mapping. Used by the boundary
    /// transform; identities and claims are untouched.
    pub fn map_trust(&self, f: impl Fn(&Evidence) -> f64) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|e| e.clone().with_trust(f(e)))
                .collect(),
            mode: self.mode,
        }
    }
}

impl<'a> IntoIterator for &'a EvidenceSet {
    type Item = &'a Evidence;
    type IntoIter = std::slice::Iter<'a, Evidence>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
