//! Gateway-credential mappings, read-only.

use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::{Mapping, MappingsListResponse};

pub struct MappingsService {
    client: ApiClient,
}

impl MappingsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Mapping>, ApiError> {
        let response: MappingsListResponse = self.client.get(&["users", "mappings"]).await?;
        debug!(count = response.mappings.len(), "fetched mappings");
        Ok(response.mappings)
    }
}
