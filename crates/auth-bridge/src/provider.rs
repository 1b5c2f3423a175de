// The identity-provider seam. The OAuth/OIDC code exchange itself is the
// provider SDK's job; the bridge only needs the verified claims and the
// signed id token the exchange produces.

use async_trait::async_trait;

use auth_bridge_core::claims::Claims;
use auth_bridge_core::error::Result;

/// What a completed provider exchange hands to the bridge.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub claims: Claims,
    /// The provider-signed session token, carried into the resend-
    /// verification link when the email policy rejects the login.
    pub id_token: String,
}

/// Performs the authorization-code exchange against the configured tenant
/// and returns the verified claims. Implementations wrap the provider SDK;
/// any failure aborts the whole reconciliation.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    async fn authenticate(&self) -> Result<ProviderSession>;
}
