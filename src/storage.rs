//! Durable object storage for generated ticket documents.
//!
//! The capture workflow depends only on the [`ObjectStore`] capability -
//! `put(key, bytes) -> durable URL` - never on local filesystem paths, since
//! the deployment target may have no durable local disk.

use axum::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};

/// Object storage capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist `bytes` under `key` and return a stable URL for the object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Object store backed by an HTTP gateway (S3-compatible or Supabase-style):
/// PUT `{endpoint}/{bucket}/{key}` with an optional bearer token. The same
/// URL serves as the durable object address.
#[derive(Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, bucket: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = self.object_url(key);

        let mut request = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Object storage error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Object storage error: {} - {}",
                status, body
            )));
        }

        Ok(url)
    }
}
