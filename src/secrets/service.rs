//! Secrets CRUD and reveal orchestration over the request pipeline.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::models::{
    MessageResponse, Secret, SecretCreateRequest, SecretUpdateRequest, SecretValueResponse,
    SecretsListResponse,
};

use super::reveal::{RevealCache, RevealState, ToggleAction};

pub struct SecretsService {
    client: ApiClient,
    reveal: Mutex<RevealCache>,
}

impl SecretsService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            reveal: Mutex::new(RevealCache::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, RevealCache> {
        self.reveal.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// List the secret catalog. Metadata only - values are never included
    /// in a listing.
    pub async fn list(&self) -> Result<Vec<Secret>, ApiError> {
        let response: SecretsListResponse = self.client.get(&["users", "secrets"]).await?;
        debug!(count = response.secrets.len(), "fetched secret catalog");
        Ok(response.secrets)
    }

    pub async fn create(&self, name: &str, value: &str) -> Result<(), ApiError> {
        let request = SecretCreateRequest {
            name: name.to_string(),
            value: value.to_string(),
        };
        let _: MessageResponse = self.client.post(&["users", "secrets"], &request).await?;
        info!(name, "secret created");
        Ok(())
    }

    /// Replace a secret's value. The reveal entry is evicted on success so
    /// the UI can never keep showing the pre-edit value.
    pub async fn update(&self, name: &str, value: &str) -> Result<(), ApiError> {
        let request = SecretUpdateRequest {
            value: value.to_string(),
        };
        let _: MessageResponse = self
            .client
            .put(&["users", "secrets", name], &request)
            .await?;
        self.cache().evict(name);
        info!(name, "secret updated");
        Ok(())
    }

    /// Delete a secret, evicting its reveal entry on success.
    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self.client.delete(&["users", "secrets", name]).await?;
        self.cache().evict(name);
        info!(name, "secret deleted");
        Ok(())
    }

    /// Flip a secret between hidden and revealed, fetching the true value
    /// at most once per name until an edit or delete evicts it.
    ///
    /// The toggle decision (including the in-flight mark) happens under one
    /// lock acquisition before any await, so two rapid toggles cannot both
    /// start a fetch. A fetch failure resets that entry to hidden and
    /// surfaces the error; other entries and the session are unaffected.
    pub async fn toggle_reveal(&self, name: &str) -> Result<RevealState, ApiError> {
        let action = self.cache().toggle(name);

        let ticket = match action {
            ToggleAction::NowHidden => return Ok(RevealState::Hidden),
            ToggleAction::NowRevealed => return Ok(self.cache().state(name)),
            ToggleAction::InFlight => return Ok(RevealState::Loading),
            ToggleAction::StartFetch(ticket) => ticket,
        };

        match self.fetch_value(name).await {
            Ok(value) => {
                let mut cache = self.cache();
                if !cache.apply_value(&ticket, value) {
                    debug!(name, "discarding reveal result for evicted entry");
                }
                Ok(cache.state(name))
            }
            Err(e) => {
                self.cache().fetch_failed(&ticket);
                Err(e)
            }
        }
    }

    /// Current presentation state for one secret, for rendering
    pub fn reveal_state(&self, name: &str) -> RevealState {
        self.cache().state(name)
    }

    async fn fetch_value(&self, name: &str) -> Result<String, ApiError> {
        let response: SecretValueResponse = self
            .client
            .get(&["users", "secrets", name, "value"])
            .await?;
        Ok(response.value)
    }
}
