//! JSON-file backed store.
//!
//! Records are served from memory and the full snapshot is rewritten after
//! every mutation (write to a temp file, then rename over the old one).

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::memory_store::{InMemoryStore, StoreSnapshot};
use super::models::{CheckUpdate, Monitor, NewMonitor, Owner};
use super::store::{MonitorStore, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
    // Serializes snapshot writes so an older snapshot never lands last.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreSnapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Store file not found, starting empty.");
                StoreSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            path = %path.display(),
            owners = snapshot.owners.len(),
            monitors = snapshot.monitors.len(),
            "Loaded monitor store."
        );
        Ok(Self {
            path,
            inner: InMemoryStore::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let bytes = serde_json::to_vec_pretty(&self.inner.snapshot())?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Store snapshot written.");
        Ok(())
    }
}

#[async_trait]
impl MonitorStore for JsonFileStore {
    async fn list_owners(&self) -> Result<Vec<Owner>, StoreError> {
        self.inner.list_owners().await
    }

    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError> {
        self.inner.get_owner(owner_id).await
    }

    async fn upsert_owner(&self, owner: Owner) -> Result<Owner, StoreError> {
        let owner = self.inner.upsert_owner(owner).await?;
        self.persist().await?;
        Ok(owner)
    }

    async fn list_monitors(&self, owner_id: &str) -> Result<Vec<Monitor>, StoreError> {
        self.inner.list_monitors(owner_id).await
    }

    async fn get_monitor(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> Result<Option<Monitor>, StoreError> {
        self.inner.get_monitor(owner_id, monitor_id).await
    }

    async fn create_monitor(
        &self,
        owner_id: &str,
        new_monitor: NewMonitor,
    ) -> Result<Monitor, StoreError> {
        let monitor = self.inner.create_monitor(owner_id, new_monitor).await?;
        self.persist().await?;
        Ok(monitor)
    }

    async fn delete_monitor(&self, owner_id: &str, monitor_id: &str) -> Result<bool, StoreError> {
        let deleted = self.inner.delete_monitor(owner_id, monitor_id).await?;
        if deleted {
            self.persist().await?;
        }
        Ok(deleted)
    }

    async fn update_check(
        &self,
        owner_id: &str,
        monitor_id: &str,
        update: CheckUpdate,
    ) -> Result<Monitor, StoreError> {
        let monitor = self.inner.update_check(owner_id, monitor_id, update).await?;
        self.persist().await?;
        Ok(monitor)
    }
}
