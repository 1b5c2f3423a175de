// auth-bridge: reconciles external identity-provider logins into local
// accounts. The flow module ties everything together; the rest are the
// individual reconciliation steps, usable on their own.

pub mod events;
pub mod fields;
pub mod flow;
pub mod login_page;
pub mod policy;
pub mod provider;
pub mod resolver;
pub mod roles;
pub mod verify;

pub use events::{AuthEvent, EventListener, EventRegistry};
pub use fields::{apply_field_changes, plan_field_changes, FieldChange};
pub use flow::{FlashMessage, LoginFlow, LoginOutcome, MessageLevel, VERIFY_EMAIL_PATH};
pub use login_page::LoginPageContext;
pub use policy::check_email_policy;
pub use provider::{IdentityProviderClient, ProviderSession};
pub use resolver::{AccountResolver, Resolution};
pub use roles::{apply_role_changes, plan_role_changes, RoleChanges};
pub use verify::{decode_session_token, handle_verify_email};

pub use auth_bridge_core as core;
