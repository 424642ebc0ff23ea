use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transport used to deliver alerts, resolved from the server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelConfig {
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
        from_name: String,
    },
    Webhook {
        url: String,
        method: String, // "GET" or "POST"
        headers: Option<HashMap<String, String>>,
        body_template: Option<String>, // Tera template for POST bodies
    },
    /// Writes alerts to the log only. Meant for local runs.
    Log,
}

/// A down-transition worth telling the owner about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownAlert {
    pub contact: String,
    pub monitor_name: String,
    pub monitor_url: String,
    pub detected_at: DateTime<Utc>,
}

/// A fully rendered alert, ready for any sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    /// Raw values for senders that render their own body.
    pub context: HashMap<String, String>,
}
