// Error taxonomy for the reconciliation core. Policy and join failures are
// ordinary error values the orchestration boundary branches on; only
// storage/provider faults are unexpected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The email claim is absent or empty while the verified-email policy
    /// is in force.
    #[error("no email address associated with this identity")]
    EmailMissing,

    /// The email claim is present but not verified, raised by the policy
    /// guard and by the join paths (joining an unverified identity to an
    /// existing account would allow hijacking).
    #[error("email address has not been verified")]
    EmailNotVerified,

    /// Talking to the identity provider failed (network, credentials,
    /// token exchange).
    #[error("identity provider error: {0}")]
    IdentityProvider(String),

    /// The field-mapping configuration references an account field the
    /// user store does not know. Fatal for the request, never swallowed.
    #[error("unknown account field in claim mapping: {field}")]
    InvalidFieldMapping { field: String },

    /// An identity link for this external id already exists. Raised by
    /// `IdentityLinkStore::insert_link` to enforce uniqueness; the
    /// resolver recovers by reloading the winning link once.
    #[error("identity link already exists for external id {external_id}")]
    LinkConflict { external_id: String },

    /// The signed token on the verify-email endpoint was invalid.
    #[error("invalid verification token")]
    InvalidToken,

    /// The signed token on the verify-email endpoint was expired.
    #[error("expired verification token")]
    ExpiredToken,

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    /// Policy/join failures the login flow turns into user-facing messages
    /// instead of logging as faults.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmailMissing | Self::EmailNotVerified)
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Unified result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
