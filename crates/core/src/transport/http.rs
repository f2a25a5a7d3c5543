use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::{
    config::ClientConfig,
    error::{FiglyticsError, Result},
    transport::{Batch, Transport},
};

pub const PROJECT_KEY_HEADER: &str = "X-Project-Public-Key";
pub const CUSTOMER_ID_HEADER: &str = "X-Customer-Id";

/// POSTs batches to `<base-url>/events`.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    project_public_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            url: config.events_url(),
            project_public_key: config.project_public_key.clone().unwrap_or_default(),
        }
    }

    pub fn build_request(&self, batch: &Batch) -> Result<reqwest::Request> {
        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(PROJECT_KEY_HEADER, &self.project_public_key)
            .header(CUSTOMER_ID_HEADER, &batch.customer_id)
            .json(batch)
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_batch(&self, batch: Batch) -> Result<()> {
        let events = batch.len();
        let request = self.build_request(&batch)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FiglyticsError::TransportFailure { events, source })?;

        if !response.status().is_success() {
            tracing::warn!(events, status = %response.status(), "ingestion endpoint rejected batch");
        }

        Ok(())
    }
}
