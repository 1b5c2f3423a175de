// Account resolution: map an external identity onto a local account.
// Either an identity link already exists, or the identity is joined to an
// existing account by email/username, or a fresh account is created. All
// identity-link writes happen here.

use auth_bridge_core::claims::Claims;
use auth_bridge_core::error::{BridgeError, Result};
use auth_bridge_core::ids;
use auth_bridge_core::logger::BridgeLogger;
use auth_bridge_core::options::BridgeOptions;
use auth_bridge_core::store::{IdentityLink, IdentityLinkStore, UserRecord, UserStore};

/// How the external identity was resolved.
#[derive(Debug)]
pub enum Resolution {
    /// An identity link already pointed at this account.
    Linked(UserRecord),
    /// Joined to a pre-existing account by email/username; a link was
    /// created for it.
    Joined(UserRecord),
    /// A new account was created and linked.
    Created(UserRecord),
}

impl Resolution {
    pub fn user(&self) -> &UserRecord {
        match self {
            Self::Linked(u) | Self::Joined(u) | Self::Created(u) => u,
        }
    }

    pub fn into_user(self) -> UserRecord {
        match self {
            Self::Linked(u) | Self::Joined(u) | Self::Created(u) => u,
        }
    }

    /// True only for a freshly created account.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

pub struct AccountResolver<'a> {
    users: &'a dyn UserStore,
    links: &'a dyn IdentityLinkStore,
    options: &'a BridgeOptions,
    logger: &'a BridgeLogger,
}

impl<'a> AccountResolver<'a> {
    pub fn new(
        users: &'a dyn UserStore,
        links: &'a dyn IdentityLinkStore,
        options: &'a BridgeOptions,
        logger: &'a BridgeLogger,
    ) -> Self {
        Self {
            users,
            links,
            options,
            logger,
        }
    }

    /// Resolve the claims to a local account, creating one if needed.
    pub async fn resolve(&self, claims: &Claims) -> Result<Resolution> {
        self.logger
            .info(&format!("{}: looking up local account by external id", claims.subject));

        if let Some(link) = self.links.find_link(&claims.subject).await? {
            let user = self.load_linked_user(&link).await?;
            self.logger.info(&format!("existing account {} found by link", user.id));
            self.links
                .update_cached_claims(&claims.subject, claims_json(claims))
                .await?;
            return Ok(Resolution::Linked(user));
        }
        self.logger.info("no existing link for this identity");

        if let Some(candidate) = self.find_join_candidate(claims).await? {
            // Joining an unverified external identity to an existing
            // account would allow hijacking via a claimed email/username.
            if !claims.email_verified {
                return Err(BridgeError::EmailNotVerified);
            }
            self.logger
                .info(&format!("joining identity to existing account {}", candidate.id));
            return self.link_account(claims, candidate, Resolution::Joined).await;
        }

        let user = self.create_account(claims).await?;
        self.logger
            .info(&format!("created new account {} for {}", user.id, claims.subject));
        self.link_account(claims, user, Resolution::Created).await
    }

    async fn load_linked_user(&self, link: &IdentityLink) -> Result<UserRecord> {
        self.users.find_by_id(&link.user_id).await?.ok_or_else(|| {
            BridgeError::storage(format!(
                "identity link {} points at missing user {}",
                link.external_id, link.user_id
            ))
        })
    }

    /// Join lookup: by email when enabled, by the username claim
    /// otherwise. Either lookup only runs for a verified email or a
    /// credential-database identity; an unverified social identity never
    /// even sees whether a matching account exists.
    async fn find_join_candidate(&self, claims: &Claims) -> Result<Option<UserRecord>> {
        let trusted = claims.email_verified || claims.has_database_identity();
        if !trusted {
            return Ok(None);
        }

        if self.options.join_by_email {
            let Some(email) = claims.email.as_deref().filter(|e| !e.is_empty()) else {
                return Ok(None);
            };
            self.logger.info(&format!("{email}: join by email enabled, looking up account"));
            self.users.find_by_email(email).await
        } else {
            let Some(username) = claims.get_text(&self.options.username_claim) else {
                return Ok(None);
            };
            self.logger.info(&format!("{username}: looking up account by username"));
            self.users.find_by_username(&username).await
        }
    }

    async fn create_account(&self, claims: &Claims) -> Result<UserRecord> {
        let email = claims
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(String::from)
            .unwrap_or_else(ids::placeholder_email);

        let username = self.available_username(claims).await?;

        let mut user = UserRecord::new(ids::generate_id(), username, email);
        user.password = ids::opaque_password();
        user.active = self.options.auto_register;

        self.users.insert_user(user).await
    }

    /// The username-claim value, disambiguated with a numeric suffix until
    /// it collides with no existing account.
    async fn available_username(&self, claims: &Claims) -> Result<String> {
        let base = claims
            .get_text(&self.options.username_claim)
            .unwrap_or_else(|| claims.subject.clone());

        if self.users.find_by_username(&base).await?.is_none() {
            return Ok(base);
        }
        for n in 1u32.. {
            let candidate = format!("{base}{n}");
            if self.users.find_by_username(&candidate).await?.is_none() {
                self.logger
                    .info(&format!("username {base} taken, using {candidate}"));
                return Ok(candidate);
            }
        }
        unreachable!("username suffix space exhausted")
    }

    /// Insert the identity link. A conflict means a concurrent login won
    /// the race for this brand-new identity: reload the winning link once
    /// and sign in to its account instead.
    async fn link_account(
        &self,
        claims: &Claims,
        user: UserRecord,
        wrap: fn(UserRecord) -> Resolution,
    ) -> Result<Resolution> {
        let link = IdentityLink::new(&claims.subject, &user.id, claims_json(claims));
        match self.links.insert_link(link).await {
            Ok(()) => Ok(wrap(user)),
            Err(BridgeError::LinkConflict { .. }) => {
                self.logger
                    .warn(&format!("{}: concurrent login created the link first", claims.subject));
                match self.links.find_link(&claims.subject).await? {
                    Some(winner) => Ok(Resolution::Linked(self.load_linked_user(&winner).await?)),
                    None => Err(BridgeError::storage(format!(
                        "link for {} conflicted but cannot be loaded",
                        claims.subject
                    ))),
                }
            }
            Err(other) => Err(other),
        }
    }
}

fn claims_json(claims: &Claims) -> serde_json::Value {
    serde_json::to_value(claims).unwrap_or(serde_json::Value::Null)
}
