use async_trait::async_trait;
use thiserror::Error;

use super::models::AlertMessage;

pub mod log;
pub mod smtp;
pub mod webhook;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
    #[error("Invalid configuration for sender: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Templating error: {0}")]
    TemplatingError(String),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
}

/// Delivers a rendered alert over one transport.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), SenderError>;
}
