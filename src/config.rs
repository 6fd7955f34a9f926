//! Centralized configuration management for budget-client

use std::time::Duration;
use anyhow::{Result, Context};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_USER_AGENT: &str = "budget-client/0.1.0";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the team-builder API
    pub base_url: String,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// How long success/error banners stay visible (seconds)
    pub message_ttl_seconds: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http: HttpConfig::default(),
            message_ttl_seconds: 8,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BUDGET_CLIENT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let http = HttpConfig {
            timeout_ms: parse_env_var("BUDGET_CLIENT_TIMEOUT_MS")?.unwrap_or(10_000),
            user_agent: std::env::var("BUDGET_CLIENT_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        };

        Ok(Config {
            base_url,
            http,
            message_ttl_seconds: parse_env_var("BUDGET_CLIENT_MESSAGE_TTL_SECONDS")?.unwrap_or(8),
        })
    }

    /// Apply command line overrides on top of the environment
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_ms: Option<u64>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_ms) = timeout_ms {
            self.http.timeout_ms = timeout_ms;
        }
        self
    }

    /// Base URL without a trailing slash
    pub fn base_url_str(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http.timeout_ms)
    }

    /// Get banner lifetime as Duration
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "Base URL must use http or https, got: {}",
                url.scheme()
            ));
        }

        if self.http.timeout_ms == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be greater than zero"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
