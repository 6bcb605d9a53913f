//! Error taxonomy. Kinds are stable tags; messages are advisory.

use thiserror::Error;

/// All failure kinds the engine reports.
///
/// `InvalidPolicy`, `InvalidEvidence`, and `DomainMisuse` fail at
/// construction or operator entry, before any new state is computed.
/// `InvariantViolation` aborts an operator after the candidate state was
/// computed; the caller's state is left untouched.
#[derive(Debug, Error)]
pub enum NuanceError {
    #[error("invalid policy: {field}: {reason}")]
    InvalidPolicy { field: &'static str, reason: String },

    #[error("invalid evidence {id}: {reason}")]
    InvalidEvidence { id: String, reason: String },

    #[error("invariant {invariant} violated: {details}")]
    InvariantViolation {
        invariant: &'static str,
        details: String,
    },

    #[error("domain misuse: {reason}")]
    DomainMisuse { reason: String },
}

pub type NuanceResult<T> = Result<T, NuanceError>;
