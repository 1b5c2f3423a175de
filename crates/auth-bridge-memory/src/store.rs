// In-memory user and identity-link stores. HashMap-backed, thread-safe via
// tokio::sync::RwLock. Enforces the unique external-id constraint and,
// optionally, a profile-field allow-list so mapping misconfiguration
// surfaces the same way it would against a real user entity.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use auth_bridge_core::error::{BridgeError, Result};
use auth_bridge_core::store::{IdentityLink, IdentityLinkStore, UserRecord, UserStore};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, UserRecord>,
    links: HashMap<String, IdentityLink>,
}

/// In-memory backend implementing both storage traits. Data is lost when
/// the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryBridgeStore {
    inner: Arc<RwLock<Inner>>,
    /// When set, `update_user`/`insert_user` reject profile fields outside
    /// this set, mirroring a host user entity with a fixed field registry.
    profile_fields: Option<Arc<HashSet<String>>>,
}

impl MemoryBridgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the accepted profile field names.
    pub fn with_profile_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            profile_fields: Some(Arc::new(fields.into_iter().map(Into::into).collect())),
        }
    }

    /// Seed an existing account, as if it predated the bridge.
    pub async fn seed_user(&self, user: UserRecord) {
        self.inner.write().await.users.insert(user.id.clone(), user);
    }

    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn link_count(&self) -> usize {
        self.inner.read().await.links.len()
    }

    fn check_fields(&self, user: &UserRecord) -> Result<()> {
        if let Some(allowed) = &self.profile_fields {
            for name in user.fields.keys() {
                if !allowed.contains(name) {
                    return Err(BridgeError::InvalidFieldMapping { field: name.clone() });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryBridgeStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        Ok(self.inner.read().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord> {
        self.check_fields(&user)?;
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.id) {
            return Err(BridgeError::storage(format!("duplicate user id {}", user.id)));
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &UserRecord) -> Result<()> {
        self.check_fields(user)?;
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(BridgeError::storage(format!("no such user {}", user.id))),
        }
    }
}

#[async_trait]
impl IdentityLinkStore for MemoryBridgeStore {
    async fn find_link(&self, external_id: &str) -> Result<Option<IdentityLink>> {
        Ok(self.inner.read().await.links.get(external_id).cloned())
    }

    async fn insert_link(&self, link: IdentityLink) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.links.contains_key(&link.external_id) {
            return Err(BridgeError::LinkConflict {
                external_id: link.external_id,
            });
        }
        inner.links.insert(link.external_id.clone(), link);
        Ok(())
    }

    async fn update_cached_claims(&self, external_id: &str, claims: serde_json::Value) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.links.get_mut(external_id) {
            Some(link) => {
                link.cached_claims = claims;
                Ok(())
            }
            None => Err(BridgeError::storage(format!("no link for {external_id}"))),
        }
    }
}
