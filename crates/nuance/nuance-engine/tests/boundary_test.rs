use chrono::{TimeZone, Utc};
use nuance_core::context::{Context, Role};
use nuance_core::evidence::{Evidence, EvidenceKind};
use nuance_core::ids::AgentId;
use nuance_core::policy::Policy;
use nuance_engine::boundary::{role_factor, transform, transform_all};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn item_from(src: &str, trust: f64) -> Evidence {
    Evidence::new(
        EvidenceKind::Epistemic,
        "claim",
        0.5,
        AgentId::new(src),
        t0(),
        trust,
        60,
    )
}

fn context_with_sides() -> Context {
    let mut ctx = Context::new("k");
    ctx.i_side.insert(AgentId::new("insider"));
    ctx.not_i_side.insert(AgentId::new("outsider"));
    ctx.i_side.insert(AgentId::new("liaison"));
    ctx.not_i_side.insert(AgentId::new("liaison"));
    ctx
}

// ── Role factors ─────────────────────────────────────────────────────────

#[test]
fn factors_follow_policy() {
    let policy = Policy::default();
    assert_eq!(role_factor(Role::I, &policy), 1.0);
    assert_eq!(role_factor(Role::NotI, &policy), 0.5);
    assert_eq!(role_factor(Role::Both, &policy), 0.75);
    assert_eq!(role_factor(Role::Unknown, &policy), 0.25);
}

#[test]
fn role_resolution_prefers_explicit_assignment() {
    let mut ctx = context_with_sides();
    ctx.roles.insert(AgentId::new("outsider"), Role::I);
    assert_eq!(ctx.role_of(&AgentId::new("outsider")), Role::I);
    assert_eq!(ctx.role_of(&AgentId::new("insider")), Role::I);
    assert_eq!(ctx.role_of(&AgentId::new("liaison")), Role::Both);
    assert_eq!(ctx.role_of(&AgentId::new("stranger")), Role::Unknown);
}

// ── Transform ────────────────────────────────────────────────────────────

#[test]
fn insider_trust_is_unchanged() {
    let out = transform(item_from("insider", 0.8), &context_with_sides(), &Policy::default());
    assert_eq!(out.trust, 0.8);
    assert_eq!(out.base_trust(), 0.8);
}

#[test]
fn outsider_trust_is_halved() {
    let out = transform(item_from("outsider", 0.8), &context_with_sides(), &Policy::default());
    assert!((out.trust - 0.4).abs() < 1e-12);
    assert_eq!(out.base_trust(), 0.8);
}

#[test]
fn unknown_source_gets_the_deep_discount() {
    let out = transform(item_from("stranger", 0.8), &context_with_sides(), &Policy::default());
    assert!((out.trust - 0.2).abs() < 1e-12);
}

#[test]
fn coalition_member_gets_the_coalition_factor() {
    let out = transform(item_from("liaison", 0.8), &context_with_sides(), &Policy::default());
    assert!((out.trust - 0.6).abs() < 1e-12);
}

#[test]
fn retransform_derives_from_base_not_stored_trust() {
    let ctx = context_with_sides();
    let policy = Policy::default();
    let once = transform(item_from("outsider", 0.8), &ctx, &policy);
    // Transforming again must not compound: the stored base trust drives it.
    let twice = transform(once, &ctx, &policy);
    assert!((twice.trust - 0.4).abs() < 1e-12);
    assert_eq!(twice.base_trust(), 0.8);
}

#[test]
fn batch_transform_preserves_order_and_identity() {
    let items = vec![item_from("insider", 0.9), item_from("outsider", 0.9)];
    let ids: Vec<_> = items.iter().map(|e| e.id.clone()).collect();
    let out = transform_all(items, &context_with_sides(), &Policy::default());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, ids[0]);
    assert_eq!(out[1].id, ids[1]);
    assert_eq!(out[0].trust, 0.9);
    assert!((out[1].trust - 0.45).abs() < 1e-12);
}
