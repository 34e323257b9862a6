//! Generative-language API client
//!
//! One call shape: a single prompt string sent to
//! `{endpoint}/v1beta/models/{model}:generateContent`, answered with the
//! first candidate's text. Keys come from a pool and one is picked at
//! random per request.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub mod types;

use types::*;

use crate::config::{Config, RetrySettings, OFFICIAL_BASE_URL, PROXY_BASE_URL};
use crate::errors::ApiError;
use crate::observability::telemetry::{redact_secrets, track_api_call};

/// Trait abstraction over the model API, enabling test mocking.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Whether any API key is configured.
    fn has_keys(&self) -> bool;

    /// Send one prompt and return the model's text.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        format: ResponseFormat,
    ) -> Result<String, ApiError>;
}

/// Retry configuration for API calls
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries
    pub max_delay_ms: u64,
    /// HTTP status codes that should trigger a retry
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryConfig {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay_ms: settings.base_delay_ms,
            max_delay_ms: settings.max_delay_ms,
            retryable_status_codes: vec![429, 500, 502, 503, 504],
        }
    }

    /// Delay before retry number `attempt` (1-based), with ±10% jitter.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self
            .initial_delay_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(16))
            .min(self.max_delay_ms);
        let jitter = rand::rng().random_range(0.9..=1.1);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

/// Normalise the configured endpoint: no trailing slash, and the official
/// host swapped for the mirror proxy when `force_proxy` is set.
pub fn resolve_base_url(endpoint: &str, force_proxy: bool) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if force_proxy {
        if let Some(rest) = trimmed.strip_prefix(OFFICIAL_BASE_URL) {
            return format!("{}{}", PROXY_BASE_URL, rest);
        }
    }
    trimmed.to_string()
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    keys: Vec<String>,
    retry_config: RetryConfig,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs.max(5)))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        if config.api.api_keys.is_empty() {
            warn!("No API keys provided; grading and chat will answer with canned replies");
        }

        Ok(Self {
            client,
            base_url: resolve_base_url(&config.api.endpoint, config.api.force_proxy),
            keys: config.api.api_keys.clone(),
            retry_config: RetryConfig::from_settings(&config.retry),
        })
    }

    fn pick_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = rand::rng().random_range(0..self.keys.len());
        Some(&self.keys[idx])
    }

    fn url_for(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Send request with exponential backoff retry logic
    async fn send_with_retry(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiError> {
        let url = self.url_for(model);
        let mut last_error = ApiError::Network("no attempt made".to_string());

        for attempt in 0..=self.retry_config.max_retries {
            if attempt > 0 {
                let delay = self.retry_config.delay_for(attempt);
                warn!(
                    "Retry attempt {}/{} after {}ms delay",
                    attempt,
                    self.retry_config.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let key = self.pick_key().ok_or(ApiError::MissingKey)?;
            debug!("Sending request to {} (attempt {})", url, attempt + 1);

            let result = self
                .client
                .post(&url)
                .header("Content-Type", "application/json")
                .header("x-goog-api-key", key)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body_text = response
                            .text()
                            .await
                            .map_err(|e| ApiError::Network(redact_secrets(&e.to_string())))?;
                        debug!("API response body ({} chars)", body_text.len());
                        return serde_json::from_str(&body_text)
                            .map_err(|e| ApiError::Parse(e.to_string()));
                    }

                    let error_text = redact_secrets(&response.text().await.unwrap_or_default());
                    let err = ApiError::HttpStatus {
                        status: status.as_u16(),
                        message: truncate(&error_text, 300),
                    };

                    if self
                        .retry_config
                        .retryable_status_codes
                        .contains(&status.as_u16())
                    {
                        warn!("Retryable error ({})", status);
                        last_error = err;
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    if e.is_timeout() {
                        warn!("Request timed out (retrying)");
                        last_error = ApiError::Timeout;
                        continue;
                    }
                    if e.is_connect() {
                        warn!("Connection error (retrying): {}", redact_secrets(&e.to_string()));
                        last_error = ApiError::Network(redact_secrets(&e.to_string()));
                        continue;
                    }
                    return Err(ApiError::Network(redact_secrets(&e.to_string())));
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        format: ResponseFormat,
    ) -> Result<String, ApiError> {
        let body = GenerateContentRequest::prompt(prompt, format);
        let operation = match format {
            ResponseFormat::Json => "generate_json",
            ResponseFormat::Text => "generate_text",
        };
        let response =
            track_api_call(operation, model, || self.send_with_retry(model, &body)).await?;
        reply_text(&response)
    }
}

/// The reply's text, or why there is none.
fn reply_text(response: &GenerateContentResponse) -> Result<String, ApiError> {
    if let Some(reason) = response.block_reason() {
        return Err(ApiError::Blocked(reason.to_string()));
    }
    let text = response.text();
    if text.trim().is_empty() {
        return Err(ApiError::EmptyResponse);
    }
    Ok(text)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
