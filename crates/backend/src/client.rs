use std::time::Instant;

use async_trait::async_trait;
use configs::BackendConfig;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::status::check_status;
use crate::types::{DeletionResult, Profile, Volume, VolumeRequest};

/// The four backend operations the broker needs.
#[async_trait]
pub trait VolumeBackend: Send + Sync {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ClientError>;
    async fn create_volume(&self, req: &VolumeRequest) -> Result<Volume, ClientError>;
    async fn list_volumes(&self) -> Result<Vec<Volume>, ClientError>;
    async fn delete_volume(&self, volume_id: &str) -> Result<DeletionResult, ClientError>;
}

/// reqwest-backed [`VolumeBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    http: Client,
    base: Url,
    api_version: String,
}

impl HttpBackendClient {
    pub fn new(cfg: &BackendConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&cfg.endpoint)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {e}", cfg.endpoint)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidEndpoint(cfg.endpoint.clone()));
        }
        let http = Client::builder()
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http, base, api_version: cfg.api_version.clone() })
    }

    /// `{endpoint}/api/{version}/{segments...}` with each segment escaped.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidEndpoint(self.base.to_string()))?;
            path.pop_if_empty().push("api").push(&self.api_version).extend(segments);
        }
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(&self, op: &'static str, req: RequestBuilder) -> Result<T, ClientError> {
        let started = Instant::now();
        let resp = req.send().await.map_err(|e| {
            warn!(op, error = %e, "backend request failed");
            ClientError::Transport(e.to_string())
        })?;

        let status = resp.status().as_u16();
        debug!(op, status, elapsed_ms = started.elapsed().as_millis() as u64, "backend responded");
        if let Err(e) = check_status(status) {
            warn!(op, status, error = %e, "backend returned non-success status");
            return Err(e);
        }

        let body = resp.bytes().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(op, error = %e, "backend body is not valid JSON");
            ClientError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl VolumeBackend for HttpBackendClient {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ClientError> {
        let url = self.url(&["profiles"])?;
        self.execute("list_profiles", self.http.get(url)).await
    }

    async fn create_volume(&self, req: &VolumeRequest) -> Result<Volume, ClientError> {
        let url = self.url(&["block", "volumes"])?;
        debug!(name = %req.name, size = req.size, profile_id = %req.profile_id, "creating volume");
        self.execute("create_volume", self.http.post(url).json(req)).await
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>, ClientError> {
        let url = self.url(&["block", "volumes"])?;
        self.execute("list_volumes", self.http.get(url)).await
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<DeletionResult, ClientError> {
        let url = self.url(&["block", "volumes", volume_id])?;
        debug!(%volume_id, "deleting volume");
        self.execute("delete_volume", self.http.delete(url)).await
    }
}
