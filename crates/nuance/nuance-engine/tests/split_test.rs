use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use nuance_core::clock::MockClock;
use nuance_core::context::Context;
use nuance_core::errors::NuanceError;
use nuance_core::evidence::{Evidence, EvidenceKind};
use nuance_core::ids::{AgentId, ContextId, EvidenceId, TargetId};
use nuance_core::policy::{Policy, RelevanceFn};
use nuance_core::state::State;
use nuance_engine::{ChildSpec, RefinementEngine};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn setup() -> (RefinementEngine, Arc<MockClock>, State) {
    let clock = Arc::new(MockClock::starting_at(t0()));
    let engine = RefinementEngine::new(Policy::default(), clock.clone()).unwrap();

    let mut context = Context::new("k");
    context.i_side.insert(AgentId::new("pro"));
    context.i_side.insert(AgentId::new("con"));

    let state = State::initial(TargetId::new("parent"), ContextId::new("k"), t0());
    let items = vec![
        Evidence::new(EvidenceKind::Epistemic, "for", 0.8, AgentId::new("pro"), t0(), 1.0, 60),
        Evidence::new(EvidenceKind::Epistemic, "against", -0.8, AgentId::new("con"), t0(), 1.0, 60),
    ];
    let (state, _) = engine.incorporate(&state, &context, items).unwrap();
    (engine, clock, state)
}

// ── Entry checks ─────────────────────────────────────────────────────────

#[test]
fn zero_children_is_domain_misuse() {
    let (engine, _clock, parent) = setup();
    let err = engine.split(&parent, &[]).unwrap_err();
    assert!(matches!(err, NuanceError::DomainMisuse { .. }));
}

// ── Child construction ───────────────────────────────────────────────────

#[test]
fn each_spec_yields_one_child_and_one_record() {
    let (engine, _clock, parent) = setup();
    let specs = vec![
        ChildSpec::new("child_a"),
        ChildSpec::new("child_b"),
        ChildSpec::new("child_c"),
    ];
    let (children, records) = engine.split(&parent, &specs).unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(records.len(), 3);
    for (child, spec) in children.iter().zip(&specs) {
        assert_eq!(child.target, spec.target);
        assert_eq!(child.context, parent.context);
    }
}

#[test]
fn children_copy_the_full_parent_evidence() {
    let (engine, _clock, parent) = setup();
    let (children, _) = engine.split(&parent, &[ChildSpec::new("child")]).unwrap();

    let child = &children[0];
    assert_eq!(child.evidence.len(), parent.evidence.len());
    for item in parent.evidence.iter() {
        assert!(child.evidence.contains(&item.id));
    }
}

#[test]
fn children_start_with_empty_penalties() {
    let (engine, _clock, parent) = setup();
    // Parent carries a conflict penalty from its opposed evidence.
    assert!(!parent.penalties.is_empty());

    let (children, _) = engine.split(&parent, &[ChildSpec::new("child")]).unwrap();
    assert!(children[0].penalties.is_empty());
    assert_eq!(children[0].meta.conflict_last_applied, None);
}

#[test]
fn child_metadata_is_seeded_fresh_with_a_split_marker() {
    let (engine, clock, parent) = setup();
    clock.advance(Duration::hours(1));

    let (children, _) = engine.split(&parent, &[ChildSpec::new("child")]).unwrap();
    let child = &children[0];

    assert_eq!(child.meta.created, t0() + Duration::hours(1));
    assert_eq!(child.meta.history, vec!["split:parent".to_string()]);
    assert_eq!(
        child.meta.tags.get("split_parent").unwrap().as_str().unwrap(),
        "parent"
    );
}

#[test]
fn relevance_override_is_flagged_in_tags() {
    let (engine, _clock, parent) = setup();
    let specs = vec![
        ChildSpec::new("plain"),
        ChildSpec::new("focused").with_relevance(RelevanceFn::constant(0.5)),
    ];
    let (children, _) = engine.split(&parent, &specs).unwrap();
    assert_eq!(
        children[0].meta.tags.get("relevance_override").unwrap(),
        &serde_json::json!(false)
    );
    assert_eq!(
        children[1].meta.tags.get("relevance_override").unwrap(),
        &serde_json::json!(true)
    );
}

// ── Relevance override scoring ───────────────────────────────────────────

#[test]
fn override_changes_the_child_score_without_touching_evidence() {
    let (engine, _clock, parent) = setup();

    let opposing_id: EvidenceId = parent
        .evidence
        .iter()
        .find(|e| e.valence < 0.0)
        .unwrap()
        .id
        .clone();
    let muted = opposing_id.clone();
    let specs = vec![
        ChildSpec::new("balanced"),
        ChildSpec::new("one_sided").with_relevance(RelevanceFn::new(move |e, _, _| {
            if e.id == muted {
                0.0
            } else {
                1.0
            }
        })),
    ];

    let (children, _) = engine.split(&parent, &specs).unwrap();
    let balanced = &children[0];
    let one_sided = &children[1];

    // The one-sided child sees less total mass, so it stays vaguer.
    assert!(one_sided.nu_raw > balanced.nu_raw);
    // But the muted item is still present in the copied evidence.
    assert!(one_sided.evidence.contains(&opposing_id));
}

#[test]
fn split_leaves_the_parent_untouched() {
    let (engine, _clock, parent) = setup();
    let before = parent.clone();
    let _ = engine.split(&parent, &[ChildSpec::new("child")]).unwrap();
    assert_eq!(parent, before);
}
