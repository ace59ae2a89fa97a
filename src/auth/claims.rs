//! Strongly-typed decode of the bearer token's embedded claims.
//!
//! The token is a three-part dot-delimited structure whose middle part is a
//! base64url-encoded JSON object. Only the claims the client needs are
//! extracted; the signature is never checked here - the backend is the
//! verifier, the client only reads `exp` to avoid a round-trip.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Expiry instant in epoch seconds
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn expires_at_ms(&self) -> i64 {
        self.exp * 1000
    }
}

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("token is not a three-part dot-delimited structure")]
    Malformed,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token payload is not a valid claims object: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Decode the claims object embedded in a bearer token.
///
/// Errors never propagate past this boundary as panics; a caller that
/// cannot decode treats the session as unverifiable, not as broken state.
pub fn decode(token: &str) -> Result<Claims, ClaimsError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ClaimsError::Malformed);
    };

    let decoded = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&decoded)?)
}

/// Assemble a decodable token around the given JSON payload
#[cfg(test)]
pub(crate) fn token_with_payload(payload: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload),
        URL_SAFE_NO_PAD.encode("signature")
    )
}
