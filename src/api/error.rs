use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unauthorized - token may be expired")]
    Unauthorized,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Fallback message when the failure carries no usable text
const GENERIC_ERROR_MESSAGE: &str = "an unexpected error occurred";

/// Structured error body the backend returns on failures.
/// `detail` is the primary field; some endpoints use `message` instead.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data.
    /// The cut backs off to a char boundary so multibyte bodies never panic.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Build the error for a non-success HTTP response.
    ///
    /// The message prefers, in order: the structured `detail` field, the
    /// structured `message` field, then a plain HTTP-status fallback with
    /// whatever body text was present.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }

        let structured = serde_json::from_str::<ErrorBody>(body).ok();
        let message = structured
            .and_then(|b| b.detail.or(b.message))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}: {}", status.as_u16(), GENERIC_ERROR_MESSAGE)
                } else {
                    format!("HTTP {}: {}", status.as_u16(), Self::truncate_body(trimmed))
                }
            });

        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
