//! Configuration Management
//!
//! Loads tigang configuration from TOML files.
//! Configuration includes:
//! - API settings (proxy endpoint, grading/chat models, key pool)
//! - Retry policy for the generative-language API
//! - Exam timing and chat history window
//! - UI theme, content override and data directory

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::TigangError;

/// Mirror proxy used instead of the official generative-language host.
pub const PROXY_BASE_URL: &str = "https://g-api.chksz.com";

/// Official host; requests aimed here are rewritten to the proxy when
/// `api.force_proxy` is on.
pub const OFFICIAL_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub exam: ExamConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Verbose output mode - CLI override
    #[serde(skip)]
    pub verbose_mode: bool,

    /// Quiet output mode - CLI override
    #[serde(skip)]
    pub quiet_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_grading_model")]
    pub grading_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Key pool; one key is picked at random per request
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default = "default_true")]
    pub force_proxy: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            grading_model: default_grading_model(),
            chat_model: default_chat_model(),
            api_keys: Vec::new(),
            force_proxy: true,
            timeout_secs: default_timeout(),
        }
    }
}

/// Retry policy for API calls (`max_retries = 0` disables retrying)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Time allowance per question in a timed exam
    #[serde(default = "default_seconds_per_question")]
    pub seconds_per_question: u64,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            seconds_per_question: default_seconds_per_question(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many earlier messages are replayed to the model
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
        }
    }
}

/// UI configuration for theme and animations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// "light", "dark" or "auto" (follow the terminal when no preference is stored)
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Enable the loading spinner
    #[serde(default = "default_true")]
    pub animations: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            animations: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Alternate lesson catalogue (JSON); the bundled one is used otherwise
    #[serde(default)]
    pub lessons_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_endpoint() -> String {
    PROXY_BASE_URL.to_string()
}
fn default_grading_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}
fn default_chat_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    2
}
fn default_base_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    30000
}
fn default_seconds_per_question() -> u64 {
    120
}
fn default_history_window() -> usize {
    10
}
fn default_theme() -> String {
    "auto".to_string()
}

/// Split a comma-separated key list, trimming and dropping empties.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

fn parse_config(content: &str, origin: &str) -> Result<Config, TigangError> {
    toml::from_str(content)
        .map_err(|e| TigangError::Config(format!("Failed to parse config {}: {}", origin, e)))
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    TigangError::Config(format!("Failed to read config from {}: {}", p, e))
                })?;
                parse_config(&content, p)?
            }
            None => {
                let mut default_paths = vec![PathBuf::from("tigang.toml")];
                if let Some(cfg) = dirs::config_dir() {
                    default_paths.push(cfg.join("tigang").join("config.toml"));
                }

                let mut loaded = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        loaded = Some(parse_config(&content, &p.display().to_string())?);
                        tracing::debug!("Loaded config from {}", p.display());
                        break;
                    }
                }
                loaded.unwrap_or_else(|| {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                })
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// Override settings from environment variables.
    fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("TIGANG_ENDPOINT") {
            self.api.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("TIGANG_GRADING_MODEL") {
            self.api.grading_model = model;
        }
        if let Ok(model) = std::env::var("TIGANG_CHAT_MODEL") {
            self.api.chat_model = model;
        }
        let env_keys = std::env::var("TIGANG_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map(|raw| parse_key_list(&raw))
            .unwrap_or_default();
        if !env_keys.is_empty() {
            self.api.api_keys = env_keys;
        }
        if let Ok(dir) = std::env::var("TIGANG_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(timeout) = std::env::var("TIGANG_TIMEOUT") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.api.timeout_secs = t;
            }
        }
    }

    /// Directory holding the local store and input history.
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tigang")
        })
    }

    /// Copy of the config safe to print: every key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api.api_keys = copy
            .api
            .api_keys
            .iter()
            .map(|k| crate::observability::telemetry::mask_key(k))
            .collect();
        copy
    }
}
