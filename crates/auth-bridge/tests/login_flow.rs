// End-to-end login reconciliation against the in-memory backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use auth_bridge::{
    AuthEvent, EventListener, IdentityProviderClient, LoginFlow, MessageLevel, ProviderSession,
};
use auth_bridge_core::claims::Claims;
use auth_bridge_core::error::{BridgeError, Result};
use auth_bridge_core::logger::BridgeLogger;
use auth_bridge_core::options::BridgeOptions;
use auth_bridge_core::store::{IdentityLinkStore, UserRecord, UserStore};
use auth_bridge_memory::MemoryBridgeStore;

struct StaticProvider {
    claims: Claims,
    id_token: String,
}

impl StaticProvider {
    fn new(claims: Claims) -> Self {
        Self {
            claims,
            id_token: "signed-id-token".into(),
        }
    }
}

#[async_trait]
impl IdentityProviderClient for StaticProvider {
    async fn authenticate(&self) -> Result<ProviderSession> {
        Ok(ProviderSession {
            claims: self.claims.clone(),
            id_token: self.id_token.clone(),
        })
    }
}

struct BrokenProvider;

#[async_trait]
impl IdentityProviderClient for BrokenProvider {
    async fn authenticate(&self) -> Result<ProviderSession> {
        Err(BridgeError::IdentityProvider("timeout".into()))
    }
}

#[derive(Default)]
struct EventRecorder {
    seen: Mutex<Vec<(AuthEvent, String)>>,
}

#[async_trait]
impl EventListener for EventRecorder {
    async fn on_event(&self, event: AuthEvent, user: &UserRecord, _claims: &Claims) {
        self.seen.lock().unwrap().push((event, user.id.clone()));
    }
}

fn flow_with(options: BridgeOptions, store: &Arc<MemoryBridgeStore>) -> LoginFlow {
    LoginFlow::new(
        options,
        store.clone() as Arc<dyn UserStore>,
        store.clone() as Arc<dyn IdentityLinkStore>,
    )
    .with_logger(BridgeLogger::disabled())
}

fn options() -> BridgeOptions {
    BridgeOptions::new("tenant.auth0.com", "cid", "c2VjcmV0").auto_register(true)
}

#[tokio::test]
async fn first_login_creates_account_and_fires_signup() {
    let store = Arc::new(MemoryBridgeStore::new());
    let signups = Arc::new(EventRecorder::default());
    let flow = flow_with(options(), &store).on(AuthEvent::SignUp, signups.clone());

    let claims = Claims::new("auth0|100")
        .with_email("carol@example.com", true)
        .with_claim("nickname", "carol");
    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), None)
        .await;

    assert!(outcome.is_success());
    let user = store.find_by_username("carol").await.unwrap().unwrap();
    assert_eq!(outcome.redirect, format!("/user/{}", user.id));
    assert_eq!(user.email, "carol@example.com");
    assert!(user.active);

    let link = store.find_link("auth0|100").await.unwrap().unwrap();
    assert_eq!(link.user_id, user.id);

    let seen = signups.seen.lock().unwrap();
    assert_eq!(*seen, vec![(AuthEvent::SignUp, user.id)]);
}

#[tokio::test]
async fn repeat_login_fires_signin_and_honors_destination() {
    let store = Arc::new(MemoryBridgeStore::new());
    let signins = Arc::new(EventRecorder::default());
    let flow = flow_with(options(), &store).on(AuthEvent::SignIn, signins.clone());

    let claims = Claims::new("auth0|100").with_claim("nickname", "carol");
    flow.handle_callback(&StaticProvider::new(claims.clone()), None)
        .await;
    assert!(signins.seen.lock().unwrap().is_empty());

    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), Some("/dashboard"))
        .await;
    assert!(outcome.is_success());
    assert_eq!(outcome.redirect, "/dashboard");
    assert_eq!(store.user_count().await, 1);
    assert_eq!(signins.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn claim_mapping_fills_profile_fields() {
    let store = Arc::new(MemoryBridgeStore::new());
    let opts = options()
        .claim_mapping("given_name|field_first_name\nfamily_name|field_last_name\nuid|uid");
    let flow = flow_with(opts, &store);

    let claims = Claims::new("auth0|200")
        .with_email("dave@example.com", true)
        .with_claim("nickname", "dave")
        .with_claim("given_name", "Dave")
        .with_claim("family_name", "Jones");
    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), None)
        .await;
    assert!(outcome.is_success());

    let user = store.find_by_username("dave").await.unwrap().unwrap();
    assert_eq!(user.field("field_first_name"), serde_json::json!("Dave"));
    assert_eq!(user.field("field_last_name"), serde_json::json!("Jones"));
    // Protected fields are never written through the mapping.
    assert!(!user.fields.contains_key("uid"));
}

#[tokio::test]
async fn roles_are_reconciled_against_the_mapping() {
    let store = Arc::new(MemoryBridgeStore::new());
    let mut seeded = UserRecord::new("u-ed", "ed", "ed@example.com");
    seeded.roles = vec!["administrator".into(), "editor".into()];
    store.seed_user(seeded).await;

    let opts = options()
        .join_by_email(true)
        .role_claim("roles")
        .role_mapping("admin|administrator\npoweruser|power_users");
    let flow = flow_with(opts, &store);

    let claims = Claims::new("auth0|300")
        .with_email("ed@example.com", true)
        .with_claim("roles", serde_json::json!(["poweruser"]));
    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), None)
        .await;
    assert!(outcome.is_success());

    let mut roles = store.find_by_id("u-ed").await.unwrap().unwrap().roles;
    roles.sort();
    // "admin" not granted, so administrator is revoked; editor is not in
    // the mapping and survives.
    assert_eq!(roles, vec!["editor".to_string(), "power_users".to_string()]);
}

#[tokio::test]
async fn missing_email_is_rejected_when_verification_required() {
    let store = Arc::new(MemoryBridgeStore::new());
    let flow = flow_with(options().require_verified_email(true), &store);

    let claims = Claims::new("auth0|400").with_claim("nickname", "noemail");
    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), None)
        .await;

    assert_eq!(outcome.redirect, "/");
    let message = outcome.message.unwrap();
    assert_eq!(message.level, MessageLevel::Error);
    assert!(message.text.contains("different provider"));
    assert_eq!(store.user_count().await, 0);
}

#[tokio::test]
async fn unverified_email_gets_resend_link_with_token() {
    let store = Arc::new(MemoryBridgeStore::new());
    let flow = flow_with(options().require_verified_email(true), &store);

    let claims = Claims::new("auth0|401").with_email("eve@example.com", false);
    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), None)
        .await;

    assert_eq!(outcome.redirect, "/");
    assert_eq!(outcome.message.unwrap().level, MessageLevel::Warning);
    assert_eq!(
        outcome.verify_email_url.as_deref(),
        Some("/auth0/verify_email?token=signed-id-token")
    );
    assert_eq!(store.user_count().await, 0);
}

#[tokio::test]
async fn unknown_profile_field_fails_the_login() {
    let store = Arc::new(MemoryBridgeStore::with_profile_fields(["field_first_name"]));
    let opts = options().claim_mapping("shoe_size|field_shoe_size");
    let flow = flow_with(opts, &store);

    let claims = Claims::new("auth0|500")
        .with_email("fred@example.com", true)
        .with_claim("nickname", "fred")
        .with_claim("shoe_size", "43");
    let outcome = flow
        .handle_callback(&StaticProvider::new(claims), None)
        .await;

    assert_eq!(outcome.redirect, "/");
    assert_eq!(outcome.message.unwrap().level, MessageLevel::Error);
}

#[tokio::test]
async fn provider_failure_becomes_generic_error_outcome() {
    let store = Arc::new(MemoryBridgeStore::new());
    let flow = flow_with(options(), &store);

    let outcome = flow.handle_callback(&BrokenProvider, None).await;
    assert_eq!(outcome.redirect, "/");
    let message = outcome.message.unwrap();
    assert_eq!(message.level, MessageLevel::Error);
    assert!(message.text.contains("problem logging you in"));
    assert_eq!(store.user_count().await, 0);
    assert_eq!(store.link_count().await, 0);
}

#[tokio::test]
async fn second_login_applies_updated_claims() {
    let store = Arc::new(MemoryBridgeStore::new());
    let opts = options().claim_mapping("given_name|field_first_name");
    let flow = flow_with(opts, &store);

    let first = Claims::new("auth0|600")
        .with_email("gina@example.com", true)
        .with_claim("nickname", "gina")
        .with_claim("given_name", "Gina");
    flow.handle_callback(&StaticProvider::new(first), None).await;

    let renamed = Claims::new("auth0|600")
        .with_email("gina@example.com", true)
        .with_claim("nickname", "gina")
        .with_claim("given_name", "Regina");
    let outcome = flow
        .handle_callback(&StaticProvider::new(renamed), None)
        .await;
    assert!(outcome.is_success());

    let user = store.find_by_username("gina").await.unwrap().unwrap();
    assert_eq!(user.field("field_first_name"), serde_json::json!("Regina"));
    assert_eq!(store.user_count().await, 1);
}
