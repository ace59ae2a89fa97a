//! Authenticated request pipeline for the console backend.
//!
//! Every outbound call goes through `ApiClient`: the bearer token is
//! attached when the token store holds one, and an unauthorized response
//! clears the store and steers the UI back to the sign-in surface.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::TokenStore;

use super::ApiError;

/// HTTP request timeout in seconds.
/// The backend answers quickly; anything slower should fail fast for the UI.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Versioned prefix shared by every backend endpoint
const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Where the UI currently is and how to send it to the sign-in surface.
///
/// The pipeline consults this on every unauthorized response. Navigation
/// runs at most once per failing call and is skipped when the UI is
/// already on the sign-in surface.
pub trait Navigator: Send + Sync {
    fn at_sign_in(&self) -> bool;
    fn go_to_sign_in(&self);
}

/// Default navigator for headless use: never navigates.
pub struct NoNavigation;

impl Navigator for NoNavigation {
    fn at_sign_in(&self) -> bool {
        false
    }

    fn go_to_sign_in(&self) {}
}

/// API client for the console backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<TokenStore>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidResponse(format!(
                "base URL cannot carry paths: {}",
                base_url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url,
            store,
            navigator: Arc::new(NoNavigation),
        })
    }

    /// Replace the navigator consulted on unauthorized responses
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Build an endpoint URL under `/api/v1`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// Attach the bearer token if the store holds one.
    /// No-op when absent: the backend is the source of truth for rejection.
    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self.with_auth(request).send().await?;
        self.check_response(response).await
    }

    /// Check if a response is successful, normalizing the failure if not
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }
        Err(ApiError::from_status(status, &body))
    }

    /// React to a server-reported unauthorized response: drop the local
    /// session and send the UI to the sign-in surface. The failing call is
    /// not retried - a retry behind an invalidated token would loop.
    pub(crate) fn handle_unauthorized(&self) {
        warn!("unauthorized response, clearing local session");
        self.store.clear();
        if !self.navigator.at_sign_in() {
            self.navigator.go_to_sign_in();
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        path: String,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("bad response from {}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(path = url.path(), "GET");
        let path = url.path().to_string();
        let response = self.execute(self.http.get(url)).await?;
        Self::parse_json(path, response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(path = url.path(), "POST");
        let path = url.path().to_string();
        let response = self.execute(self.http.post(url).json(body)).await?;
        Self::parse_json(path, response).await
    }

    /// POST with no request body, response body ignored (e.g. logout)
    pub async fn post_empty(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments);
        debug!(path = url.path(), "POST");
        self.execute(self.http.post(url)).await?;
        Ok(())
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(path = url.path(), "PUT");
        let path = url.path().to_string();
        let response = self.execute(self.http.put(url).json(body)).await?;
        Self::parse_json(path, response).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(path = url.path(), "DELETE");
        let path = url.path().to_string();
        let response = self.execute(self.http.delete(url)).await?;
        Self::parse_json(path, response).await
    }
}
