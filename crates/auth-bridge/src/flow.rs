// Login orchestration. Runs the whole reconciliation for one callback and
// converts the outcome, success or policy failure, into a redirect plus an
// optional user-facing message. Policy failures are branched on here;
// anything unanticipated is logged and turned into the generic failure
// outcome.

use std::sync::Arc;

use auth_bridge_core::claims::Claims;
use auth_bridge_core::error::{BridgeError, Result};
use auth_bridge_core::logger::BridgeLogger;
use auth_bridge_core::mapping::parse_pipe_list;
use auth_bridge_core::options::BridgeOptions;
use auth_bridge_core::store::{IdentityLinkStore, UserRecord, UserStore};

use crate::events::{AuthEvent, EventListener, EventRegistry};
use crate::fields::{apply_field_changes, plan_field_changes};
use crate::policy::check_email_policy;
use crate::provider::{IdentityProviderClient, ProviderSession};
use crate::resolver::{AccountResolver, Resolution};
use crate::roles::{apply_role_changes, plan_role_changes};

/// Path of the resend-verification endpoint, referenced from the
/// verify-your-email outcome.
pub const VERIFY_EMAIL_PATH: &str = "/auth0/verify_email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Status,
    Warning,
    Error,
}

/// A message to show the user alongside the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn status(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Status,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

/// Where to send the user and what to tell them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub redirect: String,
    pub message: Option<FlashMessage>,
    /// Set when the user should be offered a resend-verification link.
    pub verify_email_url: Option<String>,
}

impl LoginOutcome {
    pub fn to(redirect: impl Into<String>) -> Self {
        Self {
            redirect: redirect.into(),
            message: None,
            verify_email_url: None,
        }
    }

    pub fn home_with(message: FlashMessage) -> Self {
        Self {
            redirect: "/".into(),
            message: Some(message),
            verify_email_url: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.message.is_none()
    }
}

/// The reconciliation pipeline, with its collaborators injected.
pub struct LoginFlow {
    options: BridgeOptions,
    users: Arc<dyn UserStore>,
    links: Arc<dyn IdentityLinkStore>,
    events: EventRegistry,
    logger: BridgeLogger,
}

impl LoginFlow {
    pub fn new(
        options: BridgeOptions,
        users: Arc<dyn UserStore>,
        links: Arc<dyn IdentityLinkStore>,
    ) -> Self {
        Self {
            options,
            users,
            links,
            events: EventRegistry::new(),
            logger: BridgeLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: BridgeLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn on(mut self, event: AuthEvent, listener: Arc<dyn EventListener>) -> Self {
        self.events.register(event, listener);
        self
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Handle the provider callback end to end. Never returns an error:
    /// every failure becomes a user-facing outcome.
    pub async fn handle_callback(
        &self,
        provider: &dyn IdentityProviderClient,
        destination: Option<&str>,
    ) -> LoginOutcome {
        let session = match provider.authenticate().await {
            Ok(session) => {
                self.logger.info("good login");
                session
            }
            Err(err) => {
                self.logger.warn(&format!("login exception: {err}"));
                self.logger.info("failed login");
                return LoginOutcome::home_with(FlashMessage::error(
                    "There was a problem logging you in, sorry for the inconvenience.",
                ));
            }
        };

        self.process_login(&session, destination).await
    }

    async fn process_login(
        &self,
        session: &ProviderSession,
        destination: Option<&str>,
    ) -> LoginOutcome {
        self.logger.info("process user login");

        match self.reconcile(&session.claims).await {
            Ok((user, event)) => {
                self.events.dispatch(event, &user, &session.claims).await;
                match destination {
                    Some(dest) => LoginOutcome::to(dest),
                    None => LoginOutcome::to(format!("/user/{}", user.id)),
                }
            }
            Err(BridgeError::EmailMissing) => {
                self.logger.info(
                    "this account does not have an email associated; asking for another provider",
                );
                LoginOutcome::home_with(FlashMessage::error(
                    "This account does not have an email associated. \
                     Please login with a different provider.",
                ))
            }
            Err(BridgeError::EmailNotVerified) => self.fail_with_verify_email(&session.id_token),
            Err(err) => {
                self.logger.error(&format!("login failed: {err}"));
                LoginOutcome::home_with(FlashMessage::error(
                    "There was a problem logging you in, sorry for the inconvenience.",
                ))
            }
        }
    }

    /// Resolve the account and apply field/role mapping in one persisted
    /// step. Returns the final account state and which event to emit.
    async fn reconcile(&self, claims: &Claims) -> Result<(UserRecord, AuthEvent)> {
        check_email_policy(claims, self.options.require_verified_email)?;

        let resolver = AccountResolver::new(
            self.users.as_ref(),
            self.links.as_ref(),
            &self.options,
            &self.logger,
        );
        let resolution = resolver.resolve(claims).await?;
        let event = match &resolution {
            Resolution::Linked(_) => AuthEvent::SignIn,
            Resolution::Joined(_) | Resolution::Created(_) => AuthEvent::SignUp,
        };
        let mut user = resolution.into_user();

        let field_mapping = parse_pipe_list(&self.options.claim_mapping);
        let field_changes = plan_field_changes(claims, &user, &field_mapping);
        for change in &field_changes {
            self.logger.debug(&format!(
                "field {} changed from {} to {}",
                change.field, change.old, change.new
            ));
        }

        let role_mapping = parse_pipe_list(&self.options.role_mapping);
        let role_changes =
            plan_role_changes(claims, &user.roles, &role_mapping, &self.options.role_claim);
        if role_changes.is_empty() {
            self.logger.debug("no changes to roles detected");
        } else {
            self.logger.debug(&format!(
                "changes to roles detected: +{:?} -{:?}",
                role_changes.add, role_changes.remove
            ));
        }

        if !field_changes.is_empty() || !role_changes.is_empty() {
            apply_field_changes(&mut user, &field_changes);
            apply_role_changes(&mut user.roles, &role_changes);
            self.users.update_user(&user).await?;
        }

        Ok((user, event))
    }

    /// The verify-your-email outcome: warn, send home, and offer the
    /// resend link carrying the provider's signed token.
    fn fail_with_verify_email(&self, id_token: &str) -> LoginOutcome {
        LoginOutcome {
            redirect: "/".into(),
            message: Some(FlashMessage::warning(
                "Please verify your email and log in again.",
            )),
            verify_email_url: Some(format!("{VERIFY_EMAIL_PATH}?token={id_token}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors() {
        let ok = LoginOutcome::to("/user/u1");
        assert!(ok.is_success());
        assert_eq!(ok.redirect, "/user/u1");

        let failed = LoginOutcome::home_with(FlashMessage::error("nope"));
        assert!(!failed.is_success());
        assert_eq!(failed.redirect, "/");
        assert_eq!(failed.message.unwrap().level, MessageLevel::Error);
    }

    #[test]
    fn verify_email_outcome_carries_token_link() {
        let flow_less = FlashMessage::warning("Please verify your email and log in again.");
        let outcome = LoginOutcome {
            redirect: "/".into(),
            message: Some(flow_less),
            verify_email_url: Some(format!("{VERIFY_EMAIL_PATH}?token=abc")),
        };
        assert_eq!(
            outcome.verify_email_url.as_deref(),
            Some("/auth0/verify_email?token=abc")
        );
    }
}
