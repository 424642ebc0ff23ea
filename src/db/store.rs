//! Contract for the record store that holds owners and their monitors.
//!
//! Every operation addresses a single record and is expected to be atomic for
//! that record. Nothing here offers cross-record transactions.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{CheckUpdate, Monitor, NewMonitor, Owner};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Monitor not found: {owner_id}/{monitor_id}")]
    MonitorNotFound {
        owner_id: String,
        monitor_id: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MonitorStore: Send + Sync {
    async fn list_owners(&self) -> Result<Vec<Owner>, StoreError>;

    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError>;

    async fn upsert_owner(&self, owner: Owner) -> Result<Owner, StoreError>;

    /// Monitors of one owner, newest first.
    async fn list_monitors(&self, owner_id: &str) -> Result<Vec<Monitor>, StoreError>;

    async fn get_monitor(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> Result<Option<Monitor>, StoreError>;

    /// Creates the owner record on first use.
    async fn create_monitor(
        &self,
        owner_id: &str,
        new_monitor: NewMonitor,
    ) -> Result<Monitor, StoreError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_monitor(&self, owner_id: &str, monitor_id: &str) -> Result<bool, StoreError>;

    /// Writes status, check time and latency of one monitor in a single update.
    async fn update_check(
        &self,
        owner_id: &str,
        monitor_id: &str,
        update: CheckUpdate,
    ) -> Result<Monitor, StoreError>;
}
