// Storage seam: the bounded view of the host user entity the bridge reads
// and writes, the identity-link table it owns, and the async traits a
// backend implements. The bridge never deletes users or links.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The local user account as the bridge sees it. Profile fields beyond the
/// built-in ones live in the flattened `fields` map; which field names are
/// valid is the store's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Opaque placeholder; accounts created by the bridge authenticate
    /// only through the external provider.
    pub password: String,
    pub active: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Named profile fields (claim-mapping targets).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl UserRecord {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            password: String::new(),
            active: false,
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
            fields: serde_json::Map::new(),
        }
    }

    /// Current value of a profile field; absent fields read as the empty
    /// string for mapping comparison.
    pub fn field(&self, name: &str) -> Value {
        self.fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Durable association between an external subject id and a local account,
/// plus the last claims set seen for it. Unique on `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityLink {
    pub external_id: String,
    pub user_id: String,
    pub cached_claims: Value,
}

impl IdentityLink {
    pub fn new(
        external_id: impl Into<String>,
        user_id: impl Into<String>,
        cached_claims: Value,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            user_id: user_id.into(),
            cached_claims,
        }
    }
}

/// User persistence as the bridge needs it. `update_user` must reject
/// records carrying profile fields the backing user entity does not have,
/// with [`BridgeError::InvalidFieldMapping`](crate::error::BridgeError);
/// the bridge propagates that, never swallows it.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Persist a new account. Returns the stored record.
    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord>;

    /// Persist changes to an existing account.
    async fn update_user(&self, user: &UserRecord) -> Result<()>;
}

/// The one durable table the bridge owns.
#[async_trait]
pub trait IdentityLinkStore: Send + Sync + fmt::Debug {
    async fn find_link(&self, external_id: &str) -> Result<Option<IdentityLink>>;

    /// Insert a new link. Must fail with
    /// [`BridgeError::LinkConflict`](crate::error::BridgeError) when a link
    /// for the external id already exists; concurrent first logins race on
    /// this constraint and the loser recovers by reloading.
    async fn insert_link(&self, link: IdentityLink) -> Result<()>;

    /// Refresh the cached claims blob of an existing link.
    async fn update_cached_claims(&self, external_id: &str, claims: Value) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_field_reads_as_empty_string() {
        let user = UserRecord::new("u1", "alice", "alice@example.com");
        assert_eq!(user.field("field_first_name"), Value::String(String::new()));
    }

    #[test]
    fn set_field_round_trip() {
        let mut user = UserRecord::new("u1", "alice", "alice@example.com");
        user.set_field("field_first_name", Value::String("Alice".into()));
        assert_eq!(user.field("field_first_name"), Value::String("Alice".into()));
    }

    #[test]
    fn user_serde_flattens_fields() {
        let mut user = UserRecord::new("u1", "alice", "alice@example.com");
        user.set_field("field_city", Value::String("Utrecht".into()));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["field_city"], "Utrecht");
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn role_membership() {
        let mut user = UserRecord::new("u1", "alice", "alice@example.com");
        user.roles = vec!["editor".into()];
        assert!(user.has_role("editor"));
        assert!(!user.has_role("administrator"));
    }
}
