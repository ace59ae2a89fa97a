//! Wire and domain types for the console backend API.
//!
//! All request and response bodies are plain serde structs matching the
//! backend's JSON shapes. Secret listings never carry values; a value is
//! only present in `SecretValueResponse` from the dedicated value endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== Auth =====

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in whole seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub username: String,
}

// ===== Secrets =====

/// Catalog entry from the listing endpoint. The value is never included;
/// the UI shows a redacted placeholder until the value is revealed.
#[derive(Debug, Clone, Deserialize)]
pub struct Secret {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SecretsListResponse {
    pub secrets: Vec<Secret>,
}

#[derive(Debug, Deserialize)]
pub struct SecretValueResponse {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SecretCreateRequest {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SecretUpdateRequest {
    pub value: String,
}

// ===== Mappings =====

/// A gateway-credential mapping: which external account the current user
/// is known as on a given gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Mapping {
    pub gateway_name: String,
    pub gateway_username: String,
}

#[derive(Debug, Deserialize)]
pub struct MappingsListResponse {
    pub mappings: Vec<Mapping>,
}

// ===== Generic =====

/// Acknowledgement body returned by mutating endpoints
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
