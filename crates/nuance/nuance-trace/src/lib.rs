//! # nuance-trace
//!
//! Provenance for the refinement engine: an append-only collector of
//! refinement records, velocity metrics over record sequences, and a
//! system-health readout over Σ. The tracer is the only channel by which
//! operators communicate provenance to the host; no operator reads it.

pub mod velocity;

use nuance_core::ids::{ContextId, TargetId};
use nuance_core::record::{OperatorKind, RefinementRecord};

pub use velocity::{stuck_rate, velocities, velocities_raw, velocity_mean, SystemHealth};

/// Append-only record collector.
#[derive(Debug, Clone)]
pub struct Tracer {
    enabled: bool,
    records: Vec<RefinementRecord>,
}

impl Tracer {
    pub fn new() -> Self {
        Self {
            enabled: true,
            records: Vec::new(),
        }
    }

    /// A tracer that drops everything handed to it.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            records: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn records(&self) -> &[RefinementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append one record.
    pub fn record(&mut self, record: RefinementRecord) {
        if !self.enabled {
            return;
        }
        tracing::debug!(
            operator = %record.operator,
            target_id = %record.target,
            context_id = %record.context,
            nu_before = record.nu_before,
            nu_after = record.nu_after,
            "refinement recorded"
        );
        self.records.push(record);
    }

    /// Append a batch in order.
    pub fn record_all(&mut self, records: impl IntoIterator<Item = RefinementRecord>) {
        for record in records {
            self.record(record);
        }
    }

    /// Records for one target, optionally narrowed to one context.
    pub fn for_target(
        &self,
        target: &TargetId,
        context: Option<&ContextId>,
    ) -> Vec<&RefinementRecord> {
        self.records
            .iter()
            .filter(|r| &r.target == target)
            .filter(|r| context.map_or(true, |c| &r.context == c))
            .collect()
    }

    /// Records produced by one operator.
    pub fn for_operator(&self, operator: OperatorKind) -> Vec<&RefinementRecord> {
        self.records
            .iter()
            .filter(|r| r.operator == operator)
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Human-readable one-liners for every record, in order.
    pub fn dump(&self) -> Vec<String> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "[{i}] {} on {}@{}: nu_raw {:.3}->{:.3}, nu {:.3}->{:.3}",
                    r.operator,
                    r.target,
                    r.context,
                    r.nu_raw_before,
                    r.nu_raw_after,
                    r.nu_before,
                    r.nu_after
                )
            })
            .collect()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}
