//! Single-shot HTTP liveness checks.
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use serde::Serialize;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::version::VERSION;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Outcome of one probe. Failures are data here, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub reachable: bool,
    pub http_status: Option<u16>,
    pub latency_ms: u64,
    pub error_reason: Option<String>,
}

impl ProbeResult {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            reachable: false,
            http_status: None,
            latency_ms: 0,
            error_reason: Some(reason.into()),
        }
    }

    pub fn from_status(status: u16, latency_ms: u64) -> Self {
        Self {
            reachable: (200..=399).contains(&status),
            http_status: Some(status),
            latency_ms,
            error_reason: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("invalid url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
}

/// Accepts absolute http(s) URLs only.
pub fn parse_target(raw: &str) -> Result<Url, TargetError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TargetError::UnsupportedScheme(other.to_string())),
    }
}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult;
}

/// Issues a `HEAD` request and classifies the answer.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            // A redirect already proves the server is alive.
            .redirect(Policy::none())
            .user_agent(format!("UptimeGuard/{VERSION}"))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessProbe for HttpProber {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult {
        let target = match parse_target(url) {
            Ok(target) => target,
            Err(e) => return ProbeResult::unreachable(e.to_string()),
        };

        let start_time = Instant::now();
        // Dropping the send future on elapse aborts the connection.
        let result = tokio::time::timeout(timeout, self.client.head(target).send()).await;
        let latency_ms = start_time.elapsed().as_millis() as u64;

        let probe_result = match result {
            Ok(Ok(response)) => ProbeResult::from_status(response.status().as_u16(), latency_ms),
            Ok(Err(e)) if e.is_timeout() => ProbeResult::unreachable("timeout"),
            Ok(Err(e)) => ProbeResult::unreachable(describe_error(&e)),
            Err(_) => ProbeResult::unreachable("timeout"),
        };
        debug!(
            url = %url,
            reachable = probe_result.reachable,
            http_status = ?probe_result.http_status,
            latency_ms = probe_result.latency_ms,
            error = ?probe_result.error_reason,
            "Probe finished."
        );
        probe_result
    }
}

/// Flattens the source chain so DNS, refused-connection and TLS causes
/// show up in the diagnostic instead of reqwest's generic wrapper text.
fn describe_error(error: &reqwest::Error) -> String {
    let kind = if error.is_connect() {
        "connection failed"
    } else if error.is_request() {
        "request failed"
    } else {
        "error"
    };
    let mut message = format!("{kind}: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
