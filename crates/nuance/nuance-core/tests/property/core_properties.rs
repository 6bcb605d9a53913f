use chrono::{TimeZone, Utc};
use nuance_core::ids::{ContextId, TargetId};
use nuance_core::policy::{PenaltyMode, Policy};
use nuance_core::state::{invariants, PenaltySource, State};
use proptest::prelude::*;

fn arb_penalty_source() -> impl Strategy<Value = PenaltySource> {
    prop_oneof![
        Just(PenaltySource::Conflict),
        Just(PenaltySource::ScopeExpansion),
        Just(PenaltySource::MergeRupture),
        Just(PenaltySource::CategoryError),
        Just(PenaltySource::Manual),
    ]
}

fn make_state(nu_raw: f64, penalties: Vec<(PenaltySource, f64)>) -> State {
    let mut state = State::initial(
        TargetId::new("t"),
        ContextId::new("k"),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );
    state.nu_raw = nu_raw;
    for (source, value) in penalties {
        state.penalties.insert(source, value);
    }
    state
}

// ── ν derivation ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn nu_matches_the_clamped_equation(
        nu_raw in 0.0f64..=1.0,
        penalties in proptest::collection::vec((arb_penalty_source(), 0.0f64..=1.0), 0..5),
    ) {
        let state = make_state(nu_raw, penalties);

        for mode in [PenaltyMode::Max, PenaltyMode::Sum] {
            let combined = state.combined_penalty(mode);
            let expected = (nu_raw + combined).clamp(0.0, 1.0);
            prop_assert!((state.nu(mode) - expected).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&state.nu(mode)));
        }
    }
}

proptest! {
    #[test]
    fn combined_penalty_is_bounded_by_mode(
        penalties in proptest::collection::vec((arb_penalty_source(), 0.0f64..=1.0), 1..5),
    ) {
        let state = make_state(0.0, penalties.clone());

        let max_combined = state.combined_penalty(PenaltyMode::Max);
        let sum_combined = state.combined_penalty(PenaltyMode::Sum);

        // Max picks an existing value; Sum never exceeds 1.0 and never
        // undercuts Max.
        prop_assert!(state.penalties.values().any(|v| (v - max_combined).abs() < 1e-12));
        prop_assert!(sum_combined <= 1.0 + 1e-12);
        prop_assert!(sum_combined + 1e-12 >= max_combined);
    }
}

proptest! {
    #[test]
    fn detector_accepts_all_in_range_states(
        nu_raw in 0.0f64..=1.0,
        penalties in proptest::collection::vec((arb_penalty_source(), 0.0f64..=1.0), 0..5),
    ) {
        let state = make_state(nu_raw, penalties);
        prop_assert!(invariants::check(&state).is_ok());
    }
}

proptest! {
    #[test]
    fn policy_weight_validation_is_exact(delta in -0.5f64..=0.5) {
        let policy = Policy {
            w_sem: 0.4 + delta,
            ..Policy::default()
        };
        if delta.abs() > 1e-9 {
            prop_assert!(policy.validate().is_err());
        }
    }
}
