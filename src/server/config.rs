use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::notifications::models::ChannelConfig;
use crate::notifications::service::{parse_timezone, DEFAULT_DISPLAY_TIMEZONE};
use crate::sweep::{SweepOptions, DEFAULT_SWEEP_CONCURRENCY};

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_sweep_concurrency")]
    pub sweep_concurrency: usize,

    /// Upper bound on delivering one alert during a sweep.
    #[serde(default = "default_notify_timeout_ms")]
    pub notify_timeout_ms: u64,

    /// Built-in sweep timer. Without it sweeps only run through `/api/cron`.
    #[serde(default)]
    pub sweep_interval_seconds: Option<u64>,

    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,

    #[serde(default)]
    pub cron_secret: Option<String>,

    /// `smtp`, `webhook` or `log`.
    #[serde(default = "default_notification_transport")]
    pub notification_transport: String,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default = "default_smtp_from_name")]
    pub smtp_from_name: String,

    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_method")]
    pub webhook_method: String,
    #[serde(default)]
    pub webhook_body_template: Option<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub(crate) struct PartialServerConfig {
    listen_addr: Option<String>,
    data_dir: Option<String>,
    log_dir: Option<String>,
    probe_timeout_ms: Option<u64>,
    sweep_concurrency: Option<usize>,
    notify_timeout_ms: Option<u64>,
    sweep_interval_seconds: Option<u64>,
    display_timezone: Option<String>,
    cron_secret: Option<String>,
    notification_transport: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    smtp_from_name: Option<String>,
    webhook_url: Option<String>,
    webhook_method: Option<String>,
    webhook_body_template: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_sweep_concurrency() -> usize {
    DEFAULT_SWEEP_CONCURRENCY
}

fn default_notify_timeout_ms() -> u64 {
    10_000
}

fn default_display_timezone() -> String {
    DEFAULT_DISPLAY_TIMEZONE.to_string()
}

fn default_notification_transport() -> String {
    "smtp".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from_name() -> String {
    "UptimeGuard".to_string()
}

fn default_webhook_method() -> String {
    "POST".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::merge(PartialServerConfig::default(), PartialServerConfig::default())
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) => read_file_layer(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        let config = Self::merge(env_config, file_config);
        config.validate()?;
        Ok(config)
    }

    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Self {
        ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            data_dir: env_config
                .data_dir
                .or(file_config.data_dir)
                .unwrap_or_else(default_data_dir),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            probe_timeout_ms: env_config
                .probe_timeout_ms
                .or(file_config.probe_timeout_ms)
                .unwrap_or_else(default_probe_timeout_ms),
            sweep_concurrency: env_config
                .sweep_concurrency
                .or(file_config.sweep_concurrency)
                .unwrap_or_else(default_sweep_concurrency),
            notify_timeout_ms: env_config
                .notify_timeout_ms
                .or(file_config.notify_timeout_ms)
                .unwrap_or_else(default_notify_timeout_ms),
            sweep_interval_seconds: env_config
                .sweep_interval_seconds
                .or(file_config.sweep_interval_seconds),
            display_timezone: env_config
                .display_timezone
                .or(file_config.display_timezone)
                .unwrap_or_else(default_display_timezone),
            cron_secret: env_config
                .cron_secret
                .or(file_config.cron_secret)
                .filter(|secret| !secret.trim().is_empty()),
            notification_transport: env_config
                .notification_transport
                .or(file_config.notification_transport)
                .unwrap_or_else(default_notification_transport),
            smtp_host: env_config
                .smtp_host
                .or(file_config.smtp_host)
                .unwrap_or_else(default_smtp_host),
            smtp_port: env_config
                .smtp_port
                .or(file_config.smtp_port)
                .unwrap_or_else(default_smtp_port),
            smtp_username: env_config.smtp_username.or(file_config.smtp_username),
            smtp_password: env_config.smtp_password.or(file_config.smtp_password),
            smtp_from_name: env_config
                .smtp_from_name
                .or(file_config.smtp_from_name)
                .unwrap_or_else(default_smtp_from_name),
            webhook_url: env_config.webhook_url.or(file_config.webhook_url),
            webhook_method: env_config
                .webhook_method
                .or(file_config.webhook_method)
                .unwrap_or_else(default_webhook_method),
            webhook_body_template: env_config
                .webhook_body_template
                .or(file_config.webhook_body_template),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_concurrency == 0 {
            return Err("SWEEP_CONCURRENCY must be at least 1".to_string());
        }
        if self.probe_timeout_ms == 0 {
            return Err("PROBE_TIMEOUT_MS must be at least 1".to_string());
        }
        if self.notify_timeout_ms == 0 {
            return Err("NOTIFY_TIMEOUT_MS must be at least 1".to_string());
        }
        if self.sweep_interval_seconds == Some(0) {
            return Err("SWEEP_INTERVAL_SECONDS must be at least 1 when set".to_string());
        }
        parse_timezone(&self.display_timezone).map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_seconds.map(Duration::from_secs)
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            probe_timeout: self.probe_timeout(),
            concurrency: self.sweep_concurrency,
            notify_timeout: Duration::from_millis(self.notify_timeout_ms),
        }
    }

    /// Resolves the alert transport. Credential checks happen when the sender is built.
    pub fn channel_config(&self) -> Result<ChannelConfig, String> {
        match self.notification_transport.trim().to_lowercase().as_str() {
            "smtp" => Ok(ChannelConfig::Smtp {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                username: self.smtp_username.clone().unwrap_or_default(),
                password: self.smtp_password.clone().unwrap_or_default(),
                from_name: self.smtp_from_name.clone(),
            }),
            "webhook" => {
                let url = self
                    .webhook_url
                    .clone()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or("WEBHOOK_URL is required for the webhook transport")?;
                Ok(ChannelConfig::Webhook {
                    url,
                    method: self.webhook_method.clone(),
                    headers: None,
                    body_template: self.webhook_body_template.clone(),
                })
            }
            "log" => Ok(ChannelConfig::Log),
            other => Err(format!("Unknown notification transport: {other}")),
        }
    }
}

fn read_file_layer(path: &Path) -> Result<PartialServerConfig, String> {
    if !path.exists() {
        return Ok(PartialServerConfig::default());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
    toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
}
