//! Machine-checkable state invariants. The engine runs this detector on
//! every candidate state before handing it back; a violation aborts the
//! operator and the caller's state stands.

use crate::errors::{NuanceError, NuanceResult};
use crate::policy::PenaltyMode;
use crate::state::State;

/// Validate the checkable invariant subset: ν_raw domain, penalty key
/// values, derived-ν well-formedness, and evidence well-formedness.
pub fn check(state: &State) -> NuanceResult<()> {
    if !state.nu_raw.is_finite() || !(0.0..=1.0).contains(&state.nu_raw) {
        return Err(NuanceError::InvariantViolation {
            invariant: "nu_raw_domain",
            details: format!(
                "nu_raw {} outside [0, 1] for {}@{}",
                state.nu_raw, state.target, state.context
            ),
        });
    }

    for (source, value) in &state.penalties {
        if !value.is_finite() || !(0.0..=1.0).contains(value) {
            return Err(NuanceError::InvariantViolation {
                invariant: "penalty_domain",
                details: format!("penalty {source} = {value} outside [0, 1]"),
            });
        }
    }

    for mode in [PenaltyMode::Max, PenaltyMode::Sum] {
        let nu = state.nu(mode);
        if !nu.is_finite() || !(0.0..=1.0).contains(&nu) {
            return Err(NuanceError::InvariantViolation {
                invariant: "nu_derivation",
                details: format!("derived ν {nu} outside [0, 1] under {mode:?}"),
            });
        }
    }

    for item in state.evidence.iter() {
        if let Err(err) = item.validate() {
            return Err(NuanceError::InvariantViolation {
                invariant: "evidence_domain",
                details: err.to_string(),
            });
        }
    }

    Ok(())
}
