//! HTTP client for the team-builder API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::SubmitError;
use crate::models::{ApiResponse, Budget};

const TEAM_BUILDER_PATH: &str = "/team-builder";

/// Remote service that builds a product team for a budget
#[async_trait]
pub trait TeamBuilderApi: Send + Sync {
    async fn build_team(&self, budget: Budget) -> Result<ApiResponse, SubmitError>;
}

/// `reqwest`-backed implementation of [`TeamBuilderApi`]
#[derive(Debug, Clone)]
pub struct TeamBuilderClient {
    client: Client,
    base_url: String,
}

impl TeamBuilderClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.base_url_str(),
            config.http_timeout(),
            &config.http.user_agent,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn network_error(&self) -> SubmitError {
        SubmitError::Network {
            base_url: self.base_url.clone(),
        }
    }

    /// Map a transport-level failure onto the submit error taxonomy
    fn classify_transport_error(&self, err: reqwest::Error) -> SubmitError {
        if err.is_builder() {
            SubmitError::RequestConstruction(err.to_string())
        } else if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            self.network_error()
        } else {
            SubmitError::RequestConstruction(err.to_string())
        }
    }

    async fn error_from_status(&self, status: StatusCode, response: reqwest::Response) -> SubmitError {
        let status = status.as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read error body for status {}: {}", status, e);
                return SubmitError::ServerNoBody { status };
            }
        };

        match extract_error_detail(&body) {
            Some(detail) => SubmitError::Server { status, detail },
            None => SubmitError::ServerNoBody { status },
        }
    }
}

#[async_trait]
impl TeamBuilderApi for TeamBuilderClient {
    async fn build_team(&self, budget: Budget) -> Result<ApiResponse, SubmitError> {
        let url = format!("{}{}", self.base_url, TEAM_BUILDER_PATH);
        info!("Requesting team for budget {} from {}", budget, url);

        let response = self
            .client
            .get(&url)
            .query(&[("budget", budget.to_string())])
            .send()
            .await
            .map_err(|e| {
                warn!("Team builder request failed: {}", e);
                self.classify_transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = self.error_from_status(status, response).await;
            warn!("Team builder responded with status {}: {}", status, err);
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let parsed: ApiResponse = serde_json::from_slice(&bytes).map_err(|e| {
            SubmitError::RequestConstruction(format!("Invalid response from server: {}", e))
        })?;

        info!(
            "Team builder returned status '{}' with {} products",
            parsed.status,
            parsed.products.len()
        );
        Ok(parsed)
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Accepts `{"detail": "..."}`, FastAPI validation lists
/// (`{"detail": [{"msg": "..."}]}`) and `{"message": "..."}`.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    match object.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => {
            return Some(detail.clone());
        }
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    match object.get("message") {
        Some(Value::String(message)) if !message.trim().is_empty() => Some(message.clone()),
        _ => None,
    }
}
