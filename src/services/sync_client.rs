use crate::error::SyncError;
use crate::models::{SyncPayload, VoidSnapshot, WriteAck};

/// HTTP access to the void endpoint. Uses reqwest's default timeouts.
#[derive(Debug, Clone)]
pub struct VoidClient {
    http: reqwest::Client,
    endpoint: String,
}

impl VoidClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn push(&self, payload: &SyncPayload) -> Result<WriteAck, SyncError> {
        let response = self.http.post(&self.endpoint).json(payload).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::Status(response.status()));
        }
        Ok(response.json::<WriteAck>().await?)
    }

    pub async fn pull(&self) -> Result<VoidSnapshot, SyncError> {
        let response = self.http.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::Status(response.status()));
        }
        Ok(response.json::<VoidSnapshot>().await?)
    }

    pub async fn clear(&self) -> Result<WriteAck, SyncError> {
        let response = self.http.delete(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::Status(response.status()));
        }
        Ok(response.json::<WriteAck>().await?)
    }
}
