// Claim→field mapping. Pure planning: compare each configured claim value
// with the account's current field value and describe what would change.
// The orchestrator applies the plan and persists in one step.

use serde_json::Value;

use auth_bridge_core::claims::Claims;
use auth_bridge_core::mapping::{is_protected_field, MappingPair};
use auth_bridge_core::store::UserRecord;

/// One planned profile-field update.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// Compute the field updates the mapping configuration calls for. Pairs
/// targeting a protected field are skipped; absent claims resolve to the
/// empty string; unchanged values produce no entry, so running the plan
/// twice against the same claims yields an empty second plan.
pub fn plan_field_changes(
    claims: &Claims,
    user: &UserRecord,
    mapping: &[MappingPair],
) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for pair in mapping {
        if is_protected_field(&pair.to) {
            continue;
        }
        let new = claims
            .get(&pair.from)
            .map(|v| v.to_json())
            .unwrap_or_else(|| Value::String(String::new()));
        let old = user.field(&pair.to);
        if old != new {
            changes.push(FieldChange {
                field: pair.to.clone(),
                old,
                new,
            });
        }
    }
    changes
}

/// Apply a plan to the in-memory record. Whether the field names are valid
/// is decided by the user store when the record is persisted.
pub fn apply_field_changes(user: &mut UserRecord, changes: &[FieldChange]) {
    for change in changes {
        user.set_field(change.field.clone(), change.new.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_bridge_core::mapping::parse_pipe_list;
    use serde_json::json;

    fn mapping() -> Vec<MappingPair> {
        parse_pipe_list("given_name|field_first_name\nfamily_name|field_last_name")
    }

    #[test]
    fn plans_changed_fields_only() {
        let claims = Claims::new("sub")
            .with_claim("given_name", "Alice")
            .with_claim("family_name", "Smith");
        let mut user = UserRecord::new("u1", "alice", "a@example.com");
        user.set_field("field_first_name", json!("Alice"));

        let changes = plan_field_changes(&claims, &user, &mapping());
        assert_eq!(
            changes,
            vec![FieldChange {
                field: "field_last_name".into(),
                old: json!(""),
                new: json!("Smith"),
            }]
        );
    }

    #[test]
    fn absent_claim_blanks_the_field() {
        let claims = Claims::new("sub");
        let mut user = UserRecord::new("u1", "alice", "a@example.com");
        user.set_field("field_first_name", json!("Stale"));

        let changes = plan_field_changes(&claims, &user, &mapping());
        assert!(changes.iter().any(|c| c.field == "field_first_name" && c.new == json!("")));
    }

    #[test]
    fn protected_fields_never_planned() {
        let claims = Claims::new("sub").with_claim("nickname", "evil");
        let user = UserRecord::new("u1", "alice", "a@example.com");
        let mapping = parse_pipe_list("nickname|name\nnickname|pass\nnickname|status\nnickname|uid");
        assert!(plan_field_changes(&claims, &user, &mapping).is_empty());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let claims = Claims::new("sub")
            .with_claim("given_name", "Alice")
            .with_claim("family_name", "Smith");
        let mut user = UserRecord::new("u1", "alice", "a@example.com");

        let first = plan_field_changes(&claims, &user, &mapping());
        assert_eq!(first.len(), 2);
        apply_field_changes(&mut user, &first);

        let second = plan_field_changes(&claims, &user, &mapping());
        assert!(second.is_empty());
    }

    #[test]
    fn list_claims_map_as_arrays() {
        let claims = Claims::new("sub").with_claim("groups", json!(["a", "b"]));
        let user = UserRecord::new("u1", "alice", "a@example.com");
        let mapping = parse_pipe_list("groups|field_groups");

        let changes = plan_field_changes(&claims, &user, &mapping);
        assert_eq!(changes[0].new, json!(["a", "b"]));
    }
}
