//! Boundary transform: trust adjustment from the source agent's role under
//! a context. Applied once at ingestion; stored trust is already adjusted,
//! and the pre-transform value is kept in item metadata so a later
//! recontextualization can re-derive it.

use nuance_core::context::{Context, Role};
use nuance_core::evidence::Evidence;
use nuance_core::policy::Policy;

/// Trust multiplier for a role.
pub fn role_factor(role: Role, policy: &Policy) -> f64 {
    match role {
        Role::I => 1.0,
        Role::NotI => policy.not_i_trust_factor,
        Role::Both => policy.coalition_factor,
        Role::Unknown => policy.unknown_trust_factor,
    }
}

/// Transform one item for ingestion into `context`: stamp the pre-transform
/// trust, then scale by the source's role factor.
pub fn transform(item: Evidence, context: &Context, policy: &Policy) -> Evidence {
    let base = item.base_trust();
    let role = context.role_of(&item.src);
    let adjusted = (base * role_factor(role, policy)).clamp(0.0, 1.0);
    item.with_base_trust(base).with_trust(adjusted)
}

/// Transform a batch in order.
pub fn transform_all(items: Vec<Evidence>, context: &Context, policy: &Policy) -> Vec<Evidence> {
    items
        .into_iter()
        .map(|item| transform(item, context, policy))
        .collect()
}
