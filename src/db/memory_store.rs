use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::models::{CheckUpdate, Monitor, NewMonitor, Owner};
use super::store::{MonitorStore, StoreError};

/// Serialized form of the whole store, also used by the file-backed store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub owners: Vec<Owner>,
    pub monitors: Vec<Monitor>,
}

/// Process-local store. Each record lives in its own map entry, so updates
/// to one monitor never block another.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    owners: DashMap<String, Owner>,
    // Keyed by (owner_id, monitor_id).
    monitors: DashMap<(String, String), Monitor>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for owner in snapshot.owners {
            store.owners.insert(owner.id.clone(), owner);
        }
        for monitor in snapshot.monitors {
            store
                .owners
                .entry(monitor.owner_id.clone())
                .or_insert_with(|| Owner::new(monitor.owner_id.clone(), None));
            store
                .monitors
                .insert((monitor.owner_id.clone(), monitor.id.clone()), monitor);
        }
        store
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let mut owners: Vec<Owner> = self.owners.iter().map(|e| e.value().clone()).collect();
        owners.sort_by(|a, b| a.id.cmp(&b.id));
        let mut monitors: Vec<Monitor> =
            self.monitors.iter().map(|e| e.value().clone()).collect();
        monitors.sort_by(|a, b| {
            a.owner_id
                .cmp(&b.owner_id)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        StoreSnapshot { owners, monitors }
    }

    fn key(owner_id: &str, monitor_id: &str) -> (String, String) {
        (owner_id.to_string(), monitor_id.to_string())
    }
}

#[async_trait]
impl MonitorStore for InMemoryStore {
    async fn list_owners(&self) -> Result<Vec<Owner>, StoreError> {
        let mut owners: Vec<Owner> = self.owners.iter().map(|e| e.value().clone()).collect();
        owners.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(owners)
    }

    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError> {
        Ok(self.owners.get(owner_id).map(|e| e.value().clone()))
    }

    async fn upsert_owner(&self, owner: Owner) -> Result<Owner, StoreError> {
        self.owners.insert(owner.id.clone(), owner.clone());
        Ok(owner)
    }

    async fn list_monitors(&self, owner_id: &str) -> Result<Vec<Monitor>, StoreError> {
        let mut monitors: Vec<Monitor> = self
            .monitors
            .iter()
            .filter(|e| e.key().0 == owner_id)
            .map(|e| e.value().clone())
            .collect();
        monitors.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(monitors)
    }

    async fn get_monitor(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> Result<Option<Monitor>, StoreError> {
        Ok(self
            .monitors
            .get(&Self::key(owner_id, monitor_id))
            .map(|e| e.value().clone()))
    }

    async fn create_monitor(
        &self,
        owner_id: &str,
        new_monitor: NewMonitor,
    ) -> Result<Monitor, StoreError> {
        self.owners
            .entry(owner_id.to_string())
            .or_insert_with(|| Owner::new(owner_id, None));
        let monitor = Monitor::new(owner_id, new_monitor);
        self.monitors
            .insert(Self::key(owner_id, &monitor.id), monitor.clone());
        Ok(monitor)
    }

    async fn delete_monitor(&self, owner_id: &str, monitor_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .monitors
            .remove(&Self::key(owner_id, monitor_id))
            .is_some())
    }

    async fn update_check(
        &self,
        owner_id: &str,
        monitor_id: &str,
        update: CheckUpdate,
    ) -> Result<Monitor, StoreError> {
        let mut entry = self
            .monitors
            .get_mut(&Self::key(owner_id, monitor_id))
            .ok_or_else(|| StoreError::MonitorNotFound {
                owner_id: owner_id.to_string(),
                monitor_id: monitor_id.to_string(),
            })?;
        let monitor = entry.value_mut();
        monitor.status = update.status;
        monitor.last_checked = Some(update.last_checked);
        monitor.response_time_ms = update.response_time_ms;
        Ok(monitor.clone())
    }
}
