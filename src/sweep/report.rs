use chrono::{DateTime, Utc};
use serde::Serialize;

/// One problem met while handling a single monitor (or listing one owner's monitors).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorFailure {
    pub owner_id: String,
    pub monitor_id: Option<String>,
    pub reason: String,
}

impl MonitorFailure {
    pub fn new(owner_id: &str, monitor_id: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            monitor_id: monitor_id.map(str::to_string),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub monitors_checked: usize,
    pub notifications_sent: usize,
    pub errors: Vec<MonitorFailure>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SweepReport {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            monitors_checked: 0,
            notifications_sent: 0,
            errors: Vec::new(),
            cancelled: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn errors_for(&self, monitor_id: &str) -> usize {
        self.errors
            .iter()
            .filter(|e| e.monitor_id.as_deref() == Some(monitor_id))
            .count()
    }
}
