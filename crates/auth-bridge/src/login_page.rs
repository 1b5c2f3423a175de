// Context for rendering the hosted login widget. The bridge doesn't render
// HTML; it hands the front end everything the widget needs, with the
// operator's raw extra-settings blob passed through untouched.

use serde::Serialize;

use auth_bridge_core::options::BridgeOptions;

/// Everything the login page template needs to boot the widget.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageContext {
    pub domain: String,
    pub client_id: String,
    /// Opaque anti-forgery state echoed back on the callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub show_signup: bool,
    pub form_title: String,
    pub widget_cdn: String,
    pub login_css: String,
    /// Raw JSON blob of operator-supplied widget settings. Never parsed
    /// here; an empty setting becomes `{}` so the template can splice it
    /// into a script tag directly.
    pub lock_extra_settings: String,
    pub callback_url: String,
}

impl LoginPageContext {
    pub fn new(options: &BridgeOptions, base_url: &str, state: Option<String>) -> Self {
        let extra = options.lock_extra_settings.trim();
        Self {
            domain: options.domain.clone(),
            client_id: options.client_id.clone(),
            state,
            show_signup: options.allow_signup,
            form_title: options.form_title.clone(),
            widget_cdn: options.widget_cdn.clone(),
            login_css: options.login_css.clone(),
            lock_extra_settings: if extra.is_empty() {
                "{}".to_string()
            } else {
                extra.to_string()
            },
            callback_url: format!("{}/auth0/callback", base_url.trim_end_matches('/')),
        }
    }
}
