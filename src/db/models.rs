use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness state persisted on a monitor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Pending,
    Up,
    Down,
}

impl MonitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorStatus::Pending => "pending",
            MonitorStatus::Up => "up",
            MonitorStatus::Down => "down",
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub url: String,
    pub status: MonitorStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Monitor {
    pub fn new(owner_id: &str, new_monitor: NewMonitor) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            owner_id: owner_id.to_string(),
            name: new_monitor.name,
            url: normalize_url(&new_monitor.url),
            status: MonitorStatus::Pending,
            last_checked: None,
            response_time_ms: 0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub email: Option<String>,
}

impl Owner {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }

    /// The address alerts go to, if the owner left a usable one.
    pub fn contact(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewMonitor {
    pub name: String,
    pub url: String,
}

/// The fields a check writes back, always as one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckUpdate {
    pub status: MonitorStatus,
    pub last_checked: DateTime<Utc>,
    pub response_time_ms: u64,
}

/// Trims the input and assumes `https://` when no http scheme was given.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
