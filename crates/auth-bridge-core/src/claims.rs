// Claims: the verified attribute set an identity provider returns for an
// authenticated user. The fields the reconciliation core depends on are
// typed; everything else the provider sends lands in the open `extra` map
// and stays addressable by claim name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single claim value as the core understands it: a string, a boolean,
/// or a list of strings. Providers send richer JSON; anything the core
/// cannot interpret is simply not a claim value.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl ClaimValue {
    /// The value as text, if it is scalar text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Normalize to a list of strings: lists pass through, scalars are
    /// wrapped in a single-element list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(s) => vec![s],
            Self::Bool(b) => vec![b.to_string()],
        }
    }

    /// The value as JSON, for field comparison and storage.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Text(n.to_string())),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    list.push(item.as_str()?.to_string());
                }
                Some(Self::List(list))
            }
            _ => None,
        }
    }
}

/// One entry of the provider's `identities` list. The `provider` name is
/// what the core inspects: an `"auth0"` entry means the identity originated
/// from a credential database rather than a social login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub provider: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Identity {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Name of the provider entry that marks a credential-database identity.
pub const DATABASE_PROVIDER: &str = "auth0";

/// The claims set produced once per login attempt. Immutable after
/// construction; the builder methods exist for tests and for provider
/// clients assembling a set from a userinfo response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The provider's stable unique identifier for the person.
    #[serde(rename = "user_id")]
    pub subject: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub email_verified: bool,

    #[serde(default)]
    pub identities: Vec<Identity>,

    /// Any additional claims the provider sent, keyed by claim name.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Claims {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            email_verified: false,
            identities: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = Some(email.into());
        self.email_verified = verified;
        self
    }

    pub fn with_identity(mut self, provider: impl Into<String>) -> Self {
        self.identities.push(Identity::new(provider));
        self
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Look up a claim by name. The typed fields shadow the `extra` map.
    pub fn get(&self, name: &str) -> Option<ClaimValue> {
        match name {
            "user_id" => Some(ClaimValue::Text(self.subject.clone())),
            "email" => self.email.clone().map(ClaimValue::Text),
            "email_verified" => Some(ClaimValue::Bool(self.email_verified)),
            _ => self.extra.get(name).and_then(ClaimValue::from_json),
        }
    }

    /// Text value of a claim, if present and textual.
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|v| v.as_text().map(String::from))
    }

    /// Whether the email claim is present and non-empty.
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// True when any identity entry originated from the provider's own
    /// credential database (as opposed to a social connection).
    pub fn has_database_identity(&self) -> bool {
        self.identities
            .iter()
            .any(|i| i.provider == DATABASE_PROVIDER)
    }
}
