//! Engine-wide constants.

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Penalties at or below this are removed from the penalty map outright.
pub const PENALTY_PRUNE_THRESHOLD: f64 = 1e-6;

/// Number of quantized decay steps across the penalty clear window.
pub const PENALTY_DECAY_STEPS: i64 = 24;

/// Tolerance for the derived-ν equation check.
pub const NU_EPSILON: f64 = 1e-9;

/// Tolerance for the definedness-weight sum check.
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Default steepness of the exponential mass-to-definedness curve:
/// `1 - exp(-K * 2.0) = 0.85`, i.e. total mass 2.0 reads as 0.85 defined.
pub const MASS_CURVE_K: f64 = 0.948_560;

/// Evidence metadata key holding the pre-boundary-transform trust.
pub const BASE_TRUST_KEY: &str = "base_trust";

/// State tag keys read by the default semantic-definedness provider.
pub const TAG_ONTOLOGY_COVERAGE: &str = "ontology_coverage";
pub const TAG_AMBIGUITY: &str = "ambiguity";
pub const TAG_CONSTRAINT_COVERAGE: &str = "constraint_coverage";
pub const TAG_BOUNDARY_PRECISION: &str = "boundary_precision";

/// State tag keys written by Split.
pub const TAG_SPLIT_PARENT: &str = "split_parent";
pub const TAG_RELEVANCE_OVERRIDE: &str = "relevance_override";
