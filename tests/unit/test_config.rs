//! Unit tests for the config module
//!
//! Tests cover:
//! - Defaults for every section
//! - Loading from a TOML file
//! - Redaction for display

use std::io::Write;
use tigang::config::{Config, ExamConfig, UiConfig, OFFICIAL_BASE_URL, PROXY_BASE_URL};

mod defaults_tests {
    use super::*;

    #[test]
    fn test_default_ui_config() {
        let config = UiConfig::default();
        assert_eq!(config.theme, "auto");
        assert!(config.animations);
    }

    #[test]
    fn test_default_exam_allows_two_minutes_per_question() {
        assert_eq!(ExamConfig::default().seconds_per_question, 120);
    }

    #[test]
    fn test_default_endpoint_is_proxy() {
        let config = Config::default();
        assert_eq!(config.api.endpoint, PROXY_BASE_URL);
        assert_ne!(config.api.endpoint, OFFICIAL_BASE_URL);
        assert!(config.content.lessons_path.is_none());
    }
}

mod load_tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[chat]
history_window = 4

[retry]
max_retries = 0

[ui]
theme = "light"
animations = false
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.chat.history_window, 4);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.ui.theme, "light");
        assert!(!config.ui.animations);
        assert_eq!(config.exam.seconds_per_question, 120);
    }

    #[test]
    fn test_load_invalid_toml_mentions_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nendpoint = ").unwrap();
        let err = Config::load(file.path().to_str()).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("config"));
    }

    #[test]
    fn test_redacted_config_serializes_without_keys() {
        let mut config = Config::default();
        config.api.api_keys = vec!["AIzaSySecretValue9876".to_string()];
        let text = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!text.contains("SecretValue"));
        assert!(text.contains("9876"));
    }
}
