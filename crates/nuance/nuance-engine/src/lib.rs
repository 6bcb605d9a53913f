//! # nuance-engine
//!
//! The refinement-operator engine: evidence aggregation, boundary transform,
//! definedness assessment, the eight refinement operators, and the licensing
//! query. Operators are pure: each reads a state and returns a new state
//! plus a refinement record; the caller's state is never mutated.

pub mod aggregate;
pub mod boundary;
pub mod definedness;
pub mod engine;
pub mod operators;
pub mod query;

pub use aggregate::{aggregate, compute_conflict, AggregateOutcome};
pub use definedness::{
    DefMassFn, DefSemFn, DefinednessOverrides, DefaultSemanticProvider, ISemanticDefinedness,
};
pub use engine::RefinementEngine;
pub use operators::split::ChildSpec;
pub use query::{is_licensed, license_reason, null_status, query, query_next, LicenseReason,
    NullStatus, QueryResponse};
