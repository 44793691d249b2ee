//! In-memory [`VolumeBackend`] for tests and local runs without OpenSDS.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use backend::{BaseModel, ClientError, DeletionResult, Profile, Volume, VolumeBackend, VolumeRequest};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MockBackend {
    profiles: Mutex<Vec<Profile>>,
    volumes: Mutex<BTreeMap<String, Volume>>,
    fail_next: Mutex<Option<ClientError>>,
    reject_delete: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self { profiles: Mutex::new(profiles), ..Self::default() }
    }

    /// Make the next backend call return `err`.
    pub async fn fail_next(&self, err: ClientError) {
        *self.fail_next.lock().await = Some(err);
    }

    /// Make deletions answer with a non-success envelope carrying `error`.
    pub async fn reject_deletes(&self, error: Option<&str>) {
        *self.reject_delete.lock().await = error.map(str::to_string);
    }

    /// Sleep this long inside every call before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    /// Total number of backend calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn volume_ids(&self) -> Vec<String> {
        self.volumes.lock().await.keys().cloned().collect()
    }

    async fn enter(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().await;
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        match self.fail_next.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VolumeBackend for MockBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ClientError> {
        self.enter().await?;
        Ok(self.profiles.lock().await.clone())
    }

    async fn create_volume(&self, req: &VolumeRequest) -> Result<Volume, ClientError> {
        self.enter().await?;
        let vol = Volume {
            base: BaseModel { id: Uuid::new_v4().to_string(), ..BaseModel::default() },
            name: req.name.clone(),
            description: req.description.clone(),
            size: req.size,
            profile_id: req.profile_id.clone(),
        };
        self.volumes.lock().await.insert(vol.base.id.clone(), vol.clone());
        Ok(vol)
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>, ClientError> {
        self.enter().await?;
        Ok(self.volumes.lock().await.values().cloned().collect())
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<DeletionResult, ClientError> {
        self.enter().await?;
        if let Some(error) = self.reject_delete.lock().await.clone() {
            return Ok(DeletionResult { status: "Failure".into(), error });
        }
        let removed = self.volumes.lock().await.remove(volume_id);
        Ok(match removed {
            Some(_) => DeletionResult { status: DeletionResult::SUCCESS.into(), error: String::new() },
            None => DeletionResult { status: "Failure".into(), error: format!("volume {volume_id} not found") },
        })
    }
}
