// Sign-in/sign-up events, dispatched after a successful reconciliation so
// downstream collaborators (audit, analytics, provisioning) can react.
// Dispatch is fire-and-forget; listeners cannot veto a login.

use std::sync::Arc;

use async_trait::async_trait;

use auth_bridge_core::claims::Claims;
use auth_bridge_core::store::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    /// An existing account signed in through the external provider.
    SignIn,
    /// An account was created (or first joined) for an external identity.
    SignUp,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "signin",
            Self::SignUp => "signup",
        }
    }
}

/// A downstream collaborator interested in login events. Receives the
/// resolved account and the raw claims set.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: AuthEvent, user: &UserRecord, claims: &Claims);
}

/// Registry of event listeners, run in registration order.
#[derive(Clone, Default)]
pub struct EventRegistry {
    listeners: Vec<(AuthEvent, Arc<dyn EventListener>)>,
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event: AuthEvent, listener: Arc<dyn EventListener>) {
        self.listeners.push((event, listener));
    }

    pub async fn dispatch(&self, event: AuthEvent, user: &UserRecord, claims: &Claims) {
        for (registered, listener) in &self.listeners {
            if *registered == event {
                listener.on_event(event, user, claims).await;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
