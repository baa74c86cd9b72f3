/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl TracingConfig {
    /// `LOG_FORMAT=json` forces JSON output regardless of `json_format`.
    pub fn new(environment: impl Into<String>, json_format: bool, level: Option<&str>) -> Self {
        let default_filter = match level {
            Some(level) if !level.trim().is_empty() => level.to_string(),
            _ => DEFAULT_FILTER.to_string(),
        };
        Self {
            environment: environment.into(),
            json_format: json_format || log_format_is_json(),
            default_filter,
        }
    }
}

pub const DEFAULT_FILTER: &str = "info,docpipe=debug,tower_http=debug";

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: log_format_is_json(),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

fn log_format_is_json() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
