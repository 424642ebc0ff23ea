//! Test doubles shared by the unit tests.
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::db::models::{CheckUpdate, Monitor, NewMonitor, Owner};
use crate::db::{InMemoryStore, MonitorStore, StoreError};
use crate::monitoring::{LivenessProbe, ProbeResult};
use crate::notifications::models::AlertMessage;
use crate::notifications::senders::{NotificationSender, SenderError};

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<AlertMessage>>,
}

impl RecordingSender {
    pub fn messages(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: &AlertMessage) -> Result<(), SenderError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct FailingSender;

#[async_trait]
impl NotificationSender for FailingSender {
    async fn send(&self, _message: &AlertMessage) -> Result<(), SenderError> {
        Err(SenderError::SendFailed("relay refused the message".to_string()))
    }
}

/// Records the message, then takes `delay` before reporting success.
pub struct SlowSender {
    sent: Mutex<Vec<AlertMessage>>,
    delay: Duration,
}

impl SlowSender {
    pub fn new(delay: Duration) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            delay,
        }
    }

    pub fn messages(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for SlowSender {
    async fn send(&self, message: &AlertMessage) -> Result<(), SenderError> {
        self.sent.lock().unwrap().push(message.clone());
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Never finishes sending.
pub struct HangingSender;

#[async_trait]
impl NotificationSender for HangingSender {
    async fn send(&self, _message: &AlertMessage) -> Result<(), SenderError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Answers probes from a per-URL script; the last entry repeats.
#[derive(Default)]
pub struct ScriptedProbe {
    script: Mutex<HashMap<String, VecDeque<bool>>>,
    delay: Option<Duration>,
    hang: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Never answers; used to exercise cancellation.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn script(&self, url: &str, answers: &[bool]) {
        self.script
            .lock()
            .unwrap()
            .insert(url.to_string(), answers.iter().copied().collect());
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_answer(&self, url: &str) -> bool {
        let mut script = self.script.lock().unwrap();
        match script.get_mut(url) {
            Some(answers) if answers.len() > 1 => answers.pop_front().unwrap_or(true),
            Some(answers) => answers.front().copied().unwrap_or(true),
            None => true,
        }
    }
}

#[async_trait]
impl LivenessProbe for ScriptedProbe {
    async fn probe(&self, url: &str, _timeout: Duration) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.next_answer(url) {
            ProbeResult::from_status(200, 15)
        } else {
            ProbeResult::from_status(503, 20)
        }
    }
}

/// Wraps the in-memory store and fails writes for selected monitors.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    failing_writes: Mutex<HashSet<String>>,
    unavailable: bool,
    failing_reads: AtomicBool,
}

impl FlakyStore {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Makes single-record lookups fail from now on.
    pub fn fail_reads(&self) {
        self.failing_reads.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read timed out".to_string()));
        }
        Ok(())
    }

    pub fn fail_writes_for(&self, monitor_id: &str) {
        self.failing_writes
            .lock()
            .unwrap()
            .insert(monitor_id.to_string());
    }
}

#[async_trait]
impl MonitorStore for FlakyStore {
    async fn list_owners(&self) -> Result<Vec<Owner>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("credentials rejected".to_string()));
        }
        self.inner.list_owners().await
    }

    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError> {
        self.check_reads()?;
        self.inner.get_owner(owner_id).await
    }

    async fn upsert_owner(&self, owner: Owner) -> Result<Owner, StoreError> {
        self.inner.upsert_owner(owner).await
    }

    async fn list_monitors(&self, owner_id: &str) -> Result<Vec<Monitor>, StoreError> {
        self.inner.list_monitors(owner_id).await
    }

    async fn get_monitor(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> Result<Option<Monitor>, StoreError> {
        self.check_reads()?;
        self.inner.get_monitor(owner_id, monitor_id).await
    }

    async fn create_monitor(
        &self,
        owner_id: &str,
        new_monitor: NewMonitor,
    ) -> Result<Monitor, StoreError> {
        self.inner.create_monitor(owner_id, new_monitor).await
    }

    async fn delete_monitor(&self, owner_id: &str, monitor_id: &str) -> Result<bool, StoreError> {
        self.inner.delete_monitor(owner_id, monitor_id).await
    }

    async fn update_check(
        &self,
        owner_id: &str,
        monitor_id: &str,
        update: CheckUpdate,
    ) -> Result<Monitor, StoreError> {
        if self.failing_writes.lock().unwrap().contains(monitor_id) {
            return Err(StoreError::Unavailable("write conflict".to_string()));
        }
        self.inner.update_check(owner_id, monitor_id, update).await
    }
}
