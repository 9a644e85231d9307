//! Process configuration, read once at startup and shared immutably.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com";
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("$PORT must be set")]
    MissingPort,
    #[error("invalid PORT value `{0}`")]
    InvalidPort(String),
    #[error("invalid DISCORD_TIMEOUT_SECS value `{0}`")]
    InvalidTimeout(String),
}

#[derive(Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub bind_host: String,
    /// Thumbnail inserted into every embed.
    pub image_url: String,
    pub channel_id: String,
    pub token: String,
    pub api_base: String,
    pub timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) if !raw.is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            _ => return Err(ConfigError::MissingPort),
        };

        let timeout = match lookup("DISCORD_TIMEOUT_SECS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let cfg = Self {
            port,
            bind_host: lookup("BIND_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.into()),
            image_url: lookup("IMAGE_URL").unwrap_or_default(),
            channel_id: lookup("CHANNEL_ID").unwrap_or_default(),
            token: lookup("TOKEN").unwrap_or_default(),
            api_base: lookup("DISCORD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            timeout,
        };

        for (name, value) in [
            ("IMAGE_URL", &cfg.image_url),
            ("CHANNEL_ID", &cfg.channel_id),
            ("TOKEN", &cfg.token),
        ] {
            if value.is_empty() {
                tracing::warn!(variable = name, "environment variable is empty or unset");
            }
        }

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("port", &self.port)
            .field("bind_host", &self.bind_host)
            .field("image_url", &self.image_url)
            .field("channel_id", &self.channel_id)
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}
