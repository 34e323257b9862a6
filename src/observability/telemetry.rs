//! Telemetry & Observability
//!
//! Provides structured logging for tutor operations.
//! Features:
//! - API call spans with timing and outcome
//! - Configurable log levels via RUST_LOG (stderr only)
//! - Optional JSON output via TIGANG_LOG_JSON
//! - API key redaction for anything echoing request data

use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sanitize a string for safe log output by escaping control characters.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        vec![
            // Google-style API keys
            Regex::new(r"AIza[0-9A-Za-z_\-]{20,}").expect("invalid google key regex"),
            // key=... query parameters
            Regex::new(r"(?i)([?&]key=)[^&\s]+").expect("invalid query key regex"),
            // x-goog-api-key header echoes
            Regex::new(r"(?i)x-goog-api-key:\s*\S+").expect("invalid header regex"),
            // Bearer tokens
            Regex::new(r"(?i)Bearer\s+[A-Za-z0-9_\-\.]{8,}").expect("invalid bearer regex"),
        ]
    })
}

/// Redact API keys and tokens from a string before logging.
pub fn redact_secrets(input: &str) -> String {
    let mut result = input.to_string();
    for pattern in secret_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }
    result
}

/// Mask a key for display, keeping only its last four characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Initialize the global tracing subscriber.
///
/// Without RUST_LOG the filter is `warn` (or `debug` when verbose) so that
/// study output on stdout stays clean; logs always go to stderr.
pub fn init_tracing(verbose: bool) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "tigang=debug".to_string()
        } else {
            "warn".to_string()
        }
    });
    init_tracing_with_filter(&filter);
}

/// Initialize with custom filter string
pub fn init_tracing_with_filter(filter: &str) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

        if std::env::var("TIGANG_LOG_JSON").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init();
        } else {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_level(true)
                .compact()
                .with_writer(std::io::stderr);

            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .try_init();
        }
    });
}

/// Run an API call inside a span that records its duration and outcome.
pub async fn track_api_call<F, Fut, T, E>(operation: &str, model: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let span = info_span!(
        "api.call",
        operation = operation,
        model = model,
        duration_ms = tracing::field::Empty,
        success = tracing::field::Empty,
    );
    let result = f().instrument(span.clone()).await;
    let duration = start.elapsed().as_millis() as u64;
    span.record("duration_ms", duration);
    match &result {
        Ok(_) => {
            span.record("success", true);
            tracing::debug!(duration_ms = duration, "{} completed", operation);
        }
        Err(e) => {
            span.record("success", false);
            let safe_err = redact_secrets(&sanitize_for_log(&e.to_string()));
            warn!(
                duration_ms = duration,
                error = safe_err.as_str(),
                "{} failed",
                operation
            );
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_log_escapes_newlines() {
        assert_eq!(sanitize_for_log("a\nb\r\tc"), "a\\nb\\r\\tc");
        assert_eq!(sanitize_for_log("\x1b[31m"), "\\e[31m");
        assert_eq!(sanitize_for_log("纲哥"), "纲哥");
    }

    #[test]
    fn test_redact_google_key() {
        let s = "using key AIzaSyA1234567890abcdefghijklmnop now";
        let r = redact_secrets(s);
        assert!(!r.contains("AIzaSy"));
        assert!(r.contains("[REDACTED]"));
    }

    #[test]
    fn test_redact_query_key() {
        let r = redact_secrets("https://host/v1beta/models/m:generateContent?key=secret123");
        assert!(!r.contains("secret123"));
    }

    #[test]
    fn test_redact_header() {
        let r = redact_secrets("x-goog-api-key: abcdef");
        assert!(!r.contains("abcdef"));
    }

    #[test]
    fn test_redact_leaves_plain_text() {
        assert_eq!(redact_secrets("鸦片战争 1840"), "鸦片战争 1840");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcdefgh"), "****efgh");
        assert_eq!(mask_key("abc"), "****");
    }

    #[tokio::test]
    async fn test_track_api_call_passes_result_through() {
        let ok: Result<u32, String> = track_api_call("grade", "m", || async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32, String> =
            track_api_call("chat", "m", || async { Err("boom".to_string()) }).await;
        assert_eq!(err.unwrap_err(), "boom");
    }
}
