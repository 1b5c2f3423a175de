// Resend-verification endpoint. Decodes the signed session token carried in
// the link, then asks the tenant's management API to resend the
// verification email for that subject. Whatever happens, the user goes back
// home with a message.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use auth_bridge_core::error::{BridgeError, Result};
use auth_bridge_core::logger::BridgeLogger;
use auth_bridge_core::options::BridgeOptions;

use crate::flow::{FlashMessage, LoginOutcome};

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
}

/// Decode the HS256 session token with the tenant's client secret. The
/// secret is issued base64url; jsonwebtoken expects standard base64.
pub fn decode_session_token(token: &str, client_secret: &str) -> Result<String> {
    let normalized = client_secret.replace('-', "+").replace('_', "/");
    let key = DecodingKey::from_base64_secret(&normalized)
        .map_err(|_| BridgeError::InvalidToken)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = true;

    match decode::<TokenClaims>(token, &key, &validation) {
        Ok(data) => Ok(data.claims.sub),
        Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
            Err(BridgeError::ExpiredToken)
        }
        Err(_) => Err(BridgeError::InvalidToken),
    }
}

/// Handle a resend-verification request end to end.
pub async fn handle_verify_email(
    options: &BridgeOptions,
    http: &reqwest::Client,
    logger: &BridgeLogger,
    token: &str,
) -> LoginOutcome {
    let subject = match decode_session_token(token, &options.client_secret) {
        Ok(subject) => subject,
        Err(BridgeError::ExpiredToken) => {
            logger.error("verify email: session token expired");
            return LoginOutcome::home_with(FlashMessage::error(
                "Your session has expired, please log in again to verify your email.",
            ));
        }
        Err(err) => {
            logger.error(&format!("verify email: bad token: {err}"));
            return LoginOutcome::home_with(FlashMessage::error(
                "There was a problem resending the verification email, \
                 sorry for the inconvenience.",
            ));
        }
    };

    match send_verification_email(options, http, token, &subject).await {
        Ok(()) => LoginOutcome::home_with(FlashMessage::status(
            "An email verification email has been sent, please check your \
             email inbox.",
        )),
        Err(err) => {
            logger.error(&format!("verify email: resend failed: {err}"));
            LoginOutcome::home_with(FlashMessage::error(
                "Sorry, we couldn't send an email to verify your email.",
            ))
        }
    }
}

async fn send_verification_email(
    options: &BridgeOptions,
    http: &reqwest::Client,
    token: &str,
    subject: &str,
) -> Result<()> {
    let url = format!(
        "https://{}/api/users/{}/send_verification_email",
        options.domain, subject
    );
    let response = http
        .post(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| BridgeError::IdentityProvider(e.to_string()))?;
    response
        .error_for_status()
        .map_err(|e| BridgeError::IdentityProvider(e.to_string()))?;
    Ok(())
}
