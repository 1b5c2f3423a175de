// BridgeOptions: the full configuration surface of the bridge. The host
// application persists and reloads this as a serde document; the cosmetic
// widget settings are carried through without inspection.

use serde::{Deserialize, Serialize};

/// Configuration for external-IdP login reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOptions {
    /// Identity provider tenant domain (e.g. "example.auth0.com").
    pub domain: String,

    pub client_id: String,

    pub client_secret: String,

    /// Reject logins whose email claim is missing or unverified.
    #[serde(default)]
    pub require_verified_email: bool,

    /// On first login, link to an existing local account with the same
    /// email address instead of creating a new one. When off, the
    /// username claim is used for the join lookup instead.
    #[serde(default)]
    pub join_by_email: bool,

    /// Claim whose value becomes the local username (default: "nickname").
    #[serde(default = "default_username_claim")]
    pub username_claim: String,

    /// Claim whose value(s) drive role mapping. Empty disables role
    /// mapping entirely.
    #[serde(default)]
    pub role_claim: String,

    /// Claim-to-profile-field mapping, one `claim|field` pair per line.
    #[serde(default)]
    pub claim_mapping: String,

    /// Claim-value-to-role mapping, one `value|role` pair per line.
    #[serde(default)]
    pub role_mapping: String,

    /// Activate newly created accounts immediately, bypassing any
    /// registration-approval workflow of the host system.
    #[serde(default)]
    pub auto_register: bool,

    // Cosmetic widget settings. The core never inspects these; they are
    // handed to the login page context verbatim.
    #[serde(default = "default_form_title")]
    pub form_title: String,

    #[serde(default)]
    pub allow_signup: bool,

    #[serde(default)]
    pub widget_cdn: String,

    #[serde(default)]
    pub login_css: String,

    /// Extra JSON options passed to the login widget. Blank is normalized
    /// to `"{}"` at render time.
    #[serde(default)]
    pub lock_extra_settings: String,
}

fn default_username_claim() -> String {
    "nickname".to_string()
}

fn default_form_title() -> String {
    "Sign In".to_string()
}

impl BridgeOptions {
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            require_verified_email: false,
            join_by_email: false,
            username_claim: default_username_claim(),
            role_claim: String::new(),
            claim_mapping: String::new(),
            role_mapping: String::new(),
            auto_register: false,
            form_title: default_form_title(),
            allow_signup: false,
            widget_cdn: String::new(),
            login_css: String::new(),
            lock_extra_settings: String::new(),
        }
    }

    pub fn require_verified_email(mut self, on: bool) -> Self {
        self.require_verified_email = on;
        self
    }

    pub fn join_by_email(mut self, on: bool) -> Self {
        self.join_by_email = on;
        self
    }

    pub fn username_claim(mut self, claim: impl Into<String>) -> Self {
        self.username_claim = claim.into();
        self
    }

    pub fn role_claim(mut self, claim: impl Into<String>) -> Self {
        self.role_claim = claim.into();
        self
    }

    pub fn claim_mapping(mut self, blob: impl Into<String>) -> Self {
        self.claim_mapping = blob.into();
        self
    }

    pub fn role_mapping(mut self, blob: impl Into<String>) -> Self {
        self.role_mapping = blob.into();
        self
    }

    pub fn auto_register(mut self, on: bool) -> Self {
        self.auto_register = on;
        self
    }

    pub fn form_title(mut self, title: impl Into<String>) -> Self {
        self.form_title = title.into();
        self
    }

    pub fn allow_signup(mut self, on: bool) -> Self {
        self.allow_signup = on;
        self
    }

    pub fn widget_cdn(mut self, url: impl Into<String>) -> Self {
        self.widget_cdn = url.into();
        self
    }

    pub fn login_css(mut self, css: impl Into<String>) -> Self {
        self.login_css = css.into();
        self
    }

    pub fn lock_extra_settings(mut self, json: impl Into<String>) -> Self {
        self.lock_extra_settings = json.into();
        self
    }
}
