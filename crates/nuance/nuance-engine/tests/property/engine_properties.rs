use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use nuance_core::clock::MockClock;
use nuance_core::context::Context;
use nuance_core::evidence::{Evidence, EvidenceKind};
use nuance_core::ids::{AgentId, ContextId, TargetId};
use nuance_core::policy::{PenaltyMode, Policy};
use nuance_core::state::{PenaltySource, State};
use nuance_engine::RefinementEngine;
use proptest::prelude::*;

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn setup() -> (RefinementEngine, Arc<MockClock>, Context) {
    let clock = Arc::new(MockClock::starting_at(t0()));
    let engine = RefinementEngine::new(Policy::default(), clock.clone()).unwrap();
    let mut context = Context::new("k");
    for i in 0..4 {
        context.i_side.insert(AgentId::new(format!("agent{i}")));
    }
    (engine, clock, context)
}

fn arb_evidence() -> impl Strategy<Value = Evidence> {
    (
        0usize..4,
        -1.0f64..=1.0,
        0.0f64..=1.0,
        0usize..20,
    )
        .prop_map(|(agent, valence, trust, claim)| {
            Evidence::new(
                EvidenceKind::Epistemic,
                format!("observation {claim}"),
                valence,
                AgentId::new(format!("agent{agent}")),
                t0(),
                trust,
                60,
            )
        })
}

// ── P1/P2: derived ν stays on the equation, scores stay in range ─────────

proptest! {
    #[test]
    fn incorporate_keeps_scores_on_the_equation(
        items in proptest::collection::vec(arb_evidence(), 1..12),
    ) {
        let (engine, _clock, context) = setup();
        let state = State::initial(TargetId::new("t"), ContextId::new("k"), t0());

        let (next, _) = engine.incorporate(&state, &context, items).unwrap();

        prop_assert!((0.0..=1.0).contains(&next.nu_raw));
        for mode in [PenaltyMode::Max, PenaltyMode::Sum] {
            let expected = (next.nu_raw + next.combined_penalty(mode)).clamp(0.0, 1.0);
            prop_assert!((next.nu(mode) - expected).abs() < 1e-9);
        }
        for value in next.penalties.values() {
            prop_assert!((0.0..=1.0).contains(value));
        }
    }
}

// ── P4: operator purity ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn incorporate_is_deterministic(
        items in proptest::collection::vec(arb_evidence(), 1..8),
    ) {
        let (engine, _clock, context) = setup();
        let state = State::initial(TargetId::new("t"), ContextId::new("k"), t0());

        let (a, record_a) = engine.incorporate(&state, &context, items.clone()).unwrap();
        let (b, record_b) = engine.incorporate(&state, &context, items).unwrap();

        prop_assert_eq!(a, b);
        prop_assert_eq!(record_a, record_b);
    }
}

// ── P3: idempotence under strict dedup ───────────────────────────────────

proptest! {
    #[test]
    fn double_incorporate_is_idempotent_on_scores(
        items in proptest::collection::vec(arb_evidence(), 1..8),
    ) {
        let (engine, _clock, context) = setup();
        let state = State::initial(TargetId::new("t"), ContextId::new("k"), t0());

        let (once, _) = engine.incorporate(&state, &context, items.clone()).unwrap();
        let (twice, record) = engine.incorporate(&once, &context, items).unwrap();

        prop_assert!(record.evidence_added.is_empty());
        prop_assert_eq!(once.nu_raw, twice.nu_raw);
        prop_assert_eq!(once.evidence.len(), twice.evidence.len());
        prop_assert_eq!(&once.penalties, &twice.penalties);
    }
}

// ── P6: the cooldown bounds penalty increases ────────────────────────────

proptest! {
    #[test]
    fn cooldown_blocks_back_to_back_increases(minutes in 1i64..59) {
        let (engine, clock, context) = setup();
        let state = State::initial(TargetId::new("t"), ContextId::new("k"), t0());
        let items = vec![
            Evidence::new(EvidenceKind::Epistemic, "for", 0.9, AgentId::new("agent0"), t0(), 1.0, 60),
            Evidence::new(EvidenceKind::Epistemic, "against", -0.9, AgentId::new("agent1"), t0(), 1.0, 60),
        ];
        let (state, _) = engine.incorporate(&state, &context, items).unwrap();
        let first = state.penalty(PenaltySource::Conflict);
        prop_assert!(first > 0.0);

        clock.advance(Duration::minutes(minutes));
        let (after, _) = engine.conflict(&state).unwrap();
        prop_assert_eq!(after.penalty(PenaltySource::Conflict), first);
        prop_assert_eq!(after.meta.conflict_last_applied, Some(t0()));
    }
}

// ── P7: penalty decay is monotone and prunes ─────────────────────────────

proptest! {
    #[test]
    fn penalty_decay_never_increases(
        initial in 1e-7f64..=0.2,
        steps in 1i64..48,
    ) {
        let (engine, clock, _context) = setup();
        let mut state = State::initial(TargetId::new("t"), ContextId::new("k"), t0());
        state.penalties.insert(PenaltySource::Conflict, initial);
        state.meta.penalty_clear_start = Some(t0());

        clock.advance(Duration::seconds(3600 * steps));
        let (after, _) = engine.penalty_decay(&state).unwrap();

        let value = after.penalty(PenaltySource::Conflict);
        prop_assert!(value <= initial + f64::EPSILON);
        if after.penalties.contains_key(&PenaltySource::Conflict) {
            prop_assert!(value > 1e-6);
        }
    }
}

// ── P5: split preserves evidence ─────────────────────────────────────────

proptest! {
    #[test]
    fn split_children_carry_every_parent_item(
        items in proptest::collection::vec(arb_evidence(), 1..10),
    ) {
        let (engine, _clock, context) = setup();
        let state = State::initial(TargetId::new("t"), ContextId::new("k"), t0());
        let (parent, _) = engine.incorporate(&state, &context, items).unwrap();

        let specs = vec![nuance_engine::ChildSpec::new("child")];
        let (children, _) = engine.split(&parent, &specs).unwrap();

        for item in parent.evidence.iter() {
            prop_assert!(children[0].evidence.contains(&item.id));
        }
        prop_assert!(children[0].penalties.is_empty());
    }
}
