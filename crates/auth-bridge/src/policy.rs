// Verified-email policy. Pure check, no side effects: the orchestrator
// decides what to do with a failure.

use auth_bridge_core::claims::Claims;
use auth_bridge_core::error::{BridgeError, Result};

/// Validate the claims against the require-verified-email policy. With the
/// policy off this always succeeds. With it on, a missing/empty email is
/// `EmailMissing` and an unverified one is `EmailNotVerified`.
pub fn check_email_policy(claims: &Claims, require_verified_email: bool) -> Result<()> {
    if !require_verified_email {
        return Ok(());
    }
    if !claims.has_email() {
        return Err(BridgeError::EmailMissing);
    }
    if !claims.email_verified {
        return Err(BridgeError::EmailNotVerified);
    }
    Ok(())
}
