use serde::{Deserialize, Serialize};

use crate::monitoring::ProbeResult;
use crate::sweep::MonitorFailure;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// `"up"` or `"down"`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub response_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ProbeResult> for CheckResponse {
    fn from(result: ProbeResult) -> Self {
        Self {
            status: if result.reachable { "up" } else { "down" }.to_string(),
            status_code: result.http_status,
            response_time: result.latency_ms,
            error: result.error_reason,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub success: bool,
    /// Alerts delivered during the sweep.
    pub emails: usize,
    pub checked: usize,
    pub errors: Vec<MonitorFailure>,
    pub cancelled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub email: Option<String>,
    pub website_name: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateMonitorRequest {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOwnerRequest {
    pub email: Option<String>,
}
