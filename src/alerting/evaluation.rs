//! Maps a probe outcome onto the persisted status and classifies the change.
use serde::Serialize;

use crate::db::models::MonitorStatus;
use crate::monitoring::ProbeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    NoChange,
    Recovered,
    NewlyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub previous_status: MonitorStatus,
    pub new_status: MonitorStatus,
    pub kind: TransitionKind,
}

impl Transition {
    /// Only the first sweep of a down-streak alerts.
    pub fn should_notify(&self) -> bool {
        self.kind == TransitionKind::NewlyDown
    }
}

pub fn evaluate(previous_status: MonitorStatus, result: &ProbeResult) -> Transition {
    let new_status = if result.reachable {
        MonitorStatus::Up
    } else {
        MonitorStatus::Down
    };

    let kind = match (previous_status, new_status) {
        (MonitorStatus::Down, MonitorStatus::Up) => TransitionKind::Recovered,
        (MonitorStatus::Down, MonitorStatus::Down) => TransitionKind::NoChange,
        (_, MonitorStatus::Down) => TransitionKind::NewlyDown,
        _ => TransitionKind::NoChange,
    };

    Transition {
        previous_status,
        new_status,
        kind,
    }
}
