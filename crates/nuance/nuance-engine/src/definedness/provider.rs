//! Semantic-definedness providers.

use nuance_core::constants::{
    TAG_AMBIGUITY, TAG_BOUNDARY_PRECISION, TAG_CONSTRAINT_COVERAGE, TAG_ONTOLOGY_COVERAGE,
};
use nuance_core::ids::ContextId;
use nuance_core::state::State;

/// Pluggable semantic definedness. Implementations must be deterministic and
/// side-effect-free; an implementation that performs I/O forfeits the
/// engine's determinism guarantee.
pub trait ISemanticDefinedness: Send + Sync {
    /// Semantic definedness of a state in [0, 1].
    fn semantic_definedness(&self, state: &State, context: &ContextId) -> f64;
}

/// Default provider: the mean of four sub-scores the state tracks as
/// metadata tags. A fresh state (no tags) reads as fully ambiguous and
/// scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSemanticProvider;

impl ISemanticDefinedness for DefaultSemanticProvider {
    fn semantic_definedness(&self, state: &State, _context: &ContextId) -> f64 {
        let ontology = state.meta.tag_score(TAG_ONTOLOGY_COVERAGE, 0.0);
        let ambiguity = state.meta.tag_score(TAG_AMBIGUITY, 1.0);
        let constraints = state.meta.tag_score(TAG_CONSTRAINT_COVERAGE, 0.0);
        let boundary = state.meta.tag_score(TAG_BOUNDARY_PRECISION, 0.0);

        let mean = (ontology + (1.0 - ambiguity) + constraints + boundary) / 4.0;
        mean.clamp(0.0, 1.0)
    }
}
