//! Session verdict and session lifecycle.
//!
//! `is_authenticated` is the synchronous oracle: it answers from the token
//! store alone, never from the network. `AuthService` orchestrates login,
//! logout, and identity fetches through the request pipeline.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{LoginRequest, TokenResponse, UserInfo};

use super::{claims, TokenStore};

/// Synchronous authenticated/not verdict derived from the token store.
///
/// When no explicit expiry was recorded the token's own `exp` claim is
/// decoded once and memoized back into the store; repeated calls with no
/// intervening mutation answer from the stored expiry without decoding.
///
/// A definitely-expired session clears the store. A token that cannot be
/// decoded yields "not authenticated" but is left in place: "cannot
/// verify" is not "definitely expired".
pub fn is_authenticated(store: &TokenStore) -> bool {
    let Some(record) = store.read() else {
        return false;
    };

    let expires_at_ms = match record.expires_at_ms {
        Some(ms) => ms,
        None => match claims::decode(&record.token) {
            Ok(claims) => {
                let ms = claims.expires_at_ms();
                store.memoize_expiry(ms);
                ms
            }
            Err(e) => {
                debug!(error = %e, "stored token is undecodable, treating as signed out");
                return false;
            }
        },
    };

    if store.now_ms() >= expires_at_ms {
        store.clear();
        return false;
    }
    true
}

/// Login, logout, and identity fetches over the request pipeline.
/// The service is the only writer of the token store.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    store: Arc<TokenStore>,
}

impl AuthService {
    pub fn new(client: ApiClient, store: Arc<TokenStore>) -> Self {
        Self { client, store }
    }

    pub fn is_authenticated(&self) -> bool {
        is_authenticated(&self.store)
    }

    /// Authenticate and return the signed-in user's identity.
    ///
    /// The token is saved as soon as the login call succeeds; a failing
    /// identity fetch propagates but leaves the token valid, so the caller
    /// can retry the fetch without logging in again.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserInfo, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self.client.post(&["auth", "login"], &request).await?;
        self.store.save(&token.access_token, token.expires_in);
        info!(username, "login succeeded");

        self.client.get(&["users", "info"]).await
    }

    /// Tell the backend, then drop local session state unconditionally.
    /// The backend call is best-effort: the user must be able to sign out
    /// even when the network is down.
    pub async fn logout(&self) {
        if let Err(e) = self.client.post_empty(&["auth", "logout"]).await {
            warn!(error = %e, "logout call failed, clearing local session anyway");
        }
        self.store.clear();
    }

    /// The signed-in user's identity, or `None` without any network call
    /// when the oracle says the session is over.
    ///
    /// An identity fetch that fails while the session looks valid locally
    /// is taken as proof the session is actually invalid: the store is
    /// cleared and `None` returned.
    pub async fn current_user(&self) -> Option<UserInfo> {
        if !self.is_authenticated() {
            return None;
        }

        match self.client.get(&["users", "info"]).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "identity fetch failed, dropping session");
                self.store.clear();
                None
            }
        }
    }

    /// Username claim from the stored token, without network.
    /// Display hint only - the backend remains the identity authority.
    pub fn username_hint(&self) -> Option<String> {
        let token = self.store.token()?;
        claims::decode(&token).ok().map(|c| c.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::token_with_payload;
    use crate::auth::token::test_clock::ManualClock;

    /// Base URL nothing listens on, so any network call fails fast
    const DEAD_BASE_URL: &str = "http://127.0.0.1:9";

    fn service_with_clock(
        clock: Arc<ManualClock>,
    ) -> (AuthService, Arc<TokenStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(TokenStore::with_clock(dir.path().to_path_buf(), clock));
        let client = ApiClient::new(DEAD_BASE_URL, store.clone()).expect("client");
        (AuthService::new(client, store.clone()), store, dir)
    }

    #[test]
    fn no_token_means_signed_out() {
        let clock = Arc::new(ManualClock::new(0));
        let (service, _store, _dir) = service_with_clock(clock);
        assert!(!service.is_authenticated());
    }

    #[test]
    fn explicit_expiry_governs_the_verdict_over_time() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let (service, store, _dir) = service_with_clock(clock.clone());
        store.save("token", 3600);

        assert!(service.is_authenticated());

        clock.advance_secs(3599);
        assert!(service.is_authenticated());

        clock.advance_secs(1);
        assert!(!service.is_authenticated());
        assert!(store.read().is_none(), "expired session must be cleared");
    }

    #[test]
    fn missing_expiry_is_decoded_once_and_memoized() {
        let clock = Arc::new(ManualClock::new(500_000 * 1000));
        let (service, store, _dir) = service_with_clock(clock);
        let token = token_with_payload(r#"{"username":"alice","exp":500100}"#);
        store.save_unbounded(&token);

        assert!(service.is_authenticated());
        let record = store.read().expect("record kept");
        assert_eq!(record.expires_at_ms, Some(500_100 * 1000));

        // Second call answers from the memoized expiry and changes nothing.
        assert!(service.is_authenticated());
        let again = store.read().expect("record kept");
        assert_eq!(again.expires_at_ms, Some(500_100 * 1000));
        assert_eq!(again.token, token);
    }

    #[test]
    fn decoded_expiry_in_the_past_clears_the_store() {
        let clock = Arc::new(ManualClock::new(500_000 * 1000));
        let (service, store, _dir) = service_with_clock(clock);
        let token = token_with_payload(r#"{"username":"alice","exp":499000}"#);
        store.save_unbounded(&token);

        assert!(!service.is_authenticated());
        assert!(store.read().is_none());
    }

    #[test]
    fn undecodable_token_is_signed_out_but_kept() {
        let clock = Arc::new(ManualClock::new(0));
        let (service, store, _dir) = service_with_clock(clock);
        store.save_unbounded("not-a-real-token");

        assert!(!service.is_authenticated());
        let record = store.read().expect("fail-soft keeps the token");
        assert_eq!(record.token, "not-a-real-token");
        assert_eq!(record.expires_at_ms, None);
    }

    #[test]
    fn username_hint_reads_the_claim_without_network() {
        let clock = Arc::new(ManualClock::new(0));
        let (service, store, _dir) = service_with_clock(clock);
        store.save_unbounded(&token_with_payload(r#"{"username":"alice","exp":1}"#));

        assert_eq!(service.username_hint().as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn current_user_returns_none_without_network_when_signed_out() {
        let clock = Arc::new(ManualClock::new(0));
        let (service, _store, _dir) = service_with_clock(clock);

        // No token stored: must answer None immediately. A network attempt
        // against the dead base URL would error loudly rather than hang,
        // but the point is the oracle short-circuits first.
        assert_eq!(service.current_user().await, None);
    }

    #[tokio::test]
    async fn logout_clears_the_store_even_when_the_call_fails() {
        let clock = Arc::new(ManualClock::new(0));
        let (service, store, _dir) = service_with_clock(clock);
        store.save("token", 3600);

        service.logout().await;

        assert!(store.read().is_none());
    }

    #[tokio::test]
    async fn current_user_drops_the_session_when_the_fetch_fails() {
        let clock = Arc::new(ManualClock::new(0));
        let (service, store, _dir) = service_with_clock(clock);
        store.save("token", 3600);

        assert_eq!(service.current_user().await, None);
        assert!(store.read().is_none());
    }
}
