use async_trait::async_trait;
use reqwest::{header, Client, Method};
use std::collections::HashMap;
use std::time::Duration;
use tera::{Context, Tera};

use super::{NotificationSender, SenderError};
use crate::notifications::models::AlertMessage;

pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// A sender for pushing alerts to a custom webhook.
pub struct WebhookSender {
    client: Client,
    url: String,
    method: Method,
    headers: header::HeaderMap,
    body_template: Option<String>,
}

impl WebhookSender {
    pub fn new(
        url: &str,
        method: &str,
        headers: Option<&HashMap<String, String>>,
        body_template: Option<String>,
    ) -> Result<Self, SenderError> {
        if url.trim().is_empty() {
            return Err(SenderError::InvalidConfiguration(
                "Webhook URL is empty".to_string(),
            ));
        }

        let method = match method.to_uppercase().as_str() {
            "POST" => Method::POST,
            "GET" => Method::GET,
            _ => {
                return Err(SenderError::InvalidConfiguration(format!(
                    "Unsupported HTTP method: {method}"
                )));
            }
        };

        let mut header_map = header::HeaderMap::new();
        for (key, value) in headers.into_iter().flatten() {
            let header_name = header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                SenderError::InvalidConfiguration(format!("Invalid header name: {e}"))
            })?;
            let header_value = header::HeaderValue::from_str(value).map_err(|e| {
                SenderError::InvalidConfiguration(format!("Invalid header value: {e}"))
            })?;
            header_map.insert(header_name, header_value);
        }

        Ok(Self {
            client: build_client(DEFAULT_WEBHOOK_TIMEOUT)?,
            url: url.trim().to_string(),
            method,
            headers: header_map,
            body_template,
        })
    }

    /// Replaces the per-request timeout (connect included).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SenderError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn render_body(&self, message: &AlertMessage) -> Result<String, SenderError> {
        match &self.body_template {
            Some(template) => {
                let mut tera_context = Context::new();
                for (key, value) in &message.context {
                    tera_context.insert(key, value);
                }
                tera_context.insert("subject", &message.subject);
                tera_context.insert("text", &message.text_body);
                Tera::one_off(template, &tera_context, false)
                    .map_err(|e| SenderError::TemplatingError(e.to_string()))
            }
            None => serde_json::to_string(message)
                .map_err(|e| SenderError::TemplatingError(e.to_string())),
        }
    }
}

fn build_client(timeout: Duration) -> Result<Client, SenderError> {
    let client = Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(&self, message: &AlertMessage) -> Result<(), SenderError> {
        let mut request_builder = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone());

        if self.method == Method::POST {
            request_builder = request_builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(self.render_body(message)?);
        }

        let response = request_builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Webhook returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}
