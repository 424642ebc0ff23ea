use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::models::{AlertMessage, ChannelConfig, DownAlert};
use super::senders::{
    log::LogSender, smtp::SmtpSender, webhook::WebhookSender, NotificationSender, SenderError,
};

pub const DEFAULT_DISPLAY_TIMEZONE: &str = "Asia/Taipei";
const DETECTION_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Missing contact address")]
    MissingContact,
    #[error("Missing monitor name")]
    MissingMonitorName,
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Sender error: {0}")]
    SenderError(#[from] SenderError),
}

/// Renders down-alerts and hands them to the configured transport.
pub struct NotificationService {
    sender: Arc<dyn NotificationSender>,
    timezone: Tz,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn NotificationSender>, timezone: Tz) -> Self {
        Self { sender, timezone }
    }

    pub fn from_channel_config(
        config: &ChannelConfig,
        timezone_name: &str,
    ) -> Result<Self, NotificationError> {
        let timezone = parse_timezone(timezone_name)?;
        let sender: Arc<dyn NotificationSender> = match config {
            ChannelConfig::Smtp {
                host,
                port,
                username,
                password,
                from_name,
            } => Arc::new(SmtpSender::new(host, *port, username, password, from_name)?),
            ChannelConfig::Webhook {
                url,
                method,
                headers,
                body_template,
            } => Arc::new(WebhookSender::new(
                url,
                method,
                headers.as_ref(),
                body_template.clone(),
            )?),
            ChannelConfig::Log => Arc::new(LogSender),
        };
        Ok(Self::new(sender, timezone))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Formats a UTC instant in the display timezone, 24-hour clock.
    pub fn format_detection_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone)
            .format(DETECTION_TIME_FORMAT)
            .to_string()
    }

    pub fn compose_down_alert(&self, alert: &DownAlert) -> AlertMessage {
        let detected = self.format_detection_time(alert.detected_at);
        let subject = format!("[Alert] {} is unreachable!", alert.monitor_name);

        let text_body = format!(
            "Hello,\n\n\
             Your monitoring detected that the following website is currently unreachable:\n\n\
             Name: {name}\n\
             URL: {url}\n\
             Detected at: {detected} ({tz})\n\n\
             Please check your server as soon as possible.\n\n\
             -- \nThis message was sent automatically by UptimeGuard. Please do not reply.",
            name = alert.monitor_name,
            url = alert.monitor_url,
            tz = self.timezone.name(),
        );

        let name = escape_html(&alert.monitor_name);
        let url = escape_html(&alert.monitor_url);
        let html_body = format!(
            r#"<div style="font-family: Arial, sans-serif; padding: 20px; color: #333;">
  <h2 style="color: #e11d48;">Website down alert</h2>
  <p>Hello,</p>
  <p>Your monitoring detected that the following website is currently unreachable:</p>
  <div style="background: #f3f4f6; padding: 15px; border-radius: 8px; margin: 20px 0;">
    <p><strong>Name:</strong> {name}</p>
    <p><strong>URL:</strong> <a href="{url}">{url}</a></p>
    <p><strong>Detected at:</strong> {detected} ({tz})</p>
  </div>
  <p>Please check your server as soon as possible.</p>
  <hr style="border: 0; border-top: 1px solid #eee; margin: 20px 0;">
  <p style="font-size: 12px; color: #888;">This message was sent automatically by UptimeGuard. Please do not reply.</p>
</div>"#,
            tz = self.timezone.name(),
        );

        let mut context = HashMap::new();
        context.insert("contact".to_string(), alert.contact.clone());
        context.insert("monitor_name".to_string(), alert.monitor_name.clone());
        context.insert("monitor_url".to_string(), alert.monitor_url.clone());
        context.insert("detected_at".to_string(), detected);
        context.insert("timezone".to_string(), self.timezone.name().to_string());

        AlertMessage {
            to: alert.contact.clone(),
            subject,
            text_body,
            html_body,
            context,
        }
    }

    /// Sends one down-alert. Deciding whether an alert is due is the caller's job.
    pub async fn notify_down(
        &self,
        contact: &str,
        monitor_name: &str,
        monitor_url: &str,
        detected_at: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let contact = contact.trim();
        if contact.is_empty() {
            return Err(NotificationError::MissingContact);
        }
        if monitor_name.trim().is_empty() {
            return Err(NotificationError::MissingMonitorName);
        }

        let message = self.compose_down_alert(&DownAlert {
            contact: contact.to_string(),
            monitor_name: monitor_name.to_string(),
            monitor_url: monitor_url.to_string(),
            detected_at,
        });
        self.sender.send(&message).await?;
        info!(to = %contact, monitor_name = %monitor_name, "Down alert sent.");
        Ok(())
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, NotificationError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| NotificationError::UnknownTimezone(name.to_string()))
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
