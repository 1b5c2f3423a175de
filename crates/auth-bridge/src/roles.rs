// Claim→role mapping. Pure set reconciliation: roles named anywhere in the
// mapping are managed (granted or revoked by the claim value); roles the
// mapping never names are left alone. Diffs are sorted so logs and tests
// see a deterministic order.

use std::collections::BTreeSet;

use auth_bridge_core::claims::Claims;
use auth_bridge_core::mapping::MappingPair;

/// The planned role diff for one login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl RoleChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Compute the role diff. The role claim's value is normalized to a list
/// (scalar wrapped, absent → empty). An empty `role_claim` name disables
/// role mapping entirely.
pub fn plan_role_changes(
    claims: &Claims,
    current_roles: &[String],
    mapping: &[MappingPair],
    role_claim: &str,
) -> RoleChanges {
    if role_claim.is_empty() {
        return RoleChanges::default();
    }

    let claim_values: Vec<String> = claims
        .get(role_claim)
        .map(|v| v.into_list())
        .unwrap_or_default();

    let mut managed = BTreeSet::new();
    let mut granted = BTreeSet::new();
    for pair in mapping {
        managed.insert(pair.to.clone());
        if claim_values.iter().any(|v| v == &pair.from) {
            granted.insert(pair.to.clone());
        }
    }

    let current: BTreeSet<String> = current_roles.iter().cloned().collect();
    let revoked: BTreeSet<String> = managed.difference(&granted).cloned().collect();

    // target = (current − revoked) ∪ granted
    let target: BTreeSet<String> = current
        .difference(&revoked)
        .cloned()
        .chain(granted.iter().cloned())
        .collect();

    RoleChanges {
        add: target.difference(&current).cloned().collect(),
        remove: current.difference(&target).cloned().collect(),
    }
}

/// Apply a role diff to the in-memory record.
pub fn apply_role_changes(roles: &mut Vec<String>, changes: &RoleChanges) {
    roles.retain(|r| !changes.remove.contains(r));
    for role in &changes.add {
        if !roles.contains(role) {
            roles.push(role.clone());
        }
    }
}
