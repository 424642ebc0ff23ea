use async_trait::async_trait;
use tracing::info;

use super::{NotificationSender, SenderError};
use crate::notifications::models::AlertMessage;

/// Logs alerts instead of delivering them.
#[derive(Debug, Default)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, message: &AlertMessage) -> Result<(), SenderError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "Alert (log transport)."
        );
        Ok(())
    }
}
