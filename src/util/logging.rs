//! Structured logging setup for remediator
//!
//! Log records go to stderr so that `--format json` output on stdout stays
//! machine-readable. Filtering honours `RUST_LOG` when it is set; otherwise the
//! configured level applies to this crate only.
//!
//! # Example
//!
//! ```no_run
//! use remediator::util::logging::{self, LoggingConfig};
//! use tracing::Level;
//!
//! logging::init_logging(LoggingConfig::with_level(Level::DEBUG));
//! tracing::info!(repo = "acme/infra", "Planning remediation");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for records emitted by this crate
    pub level: Level,

    /// One JSON object per record instead of the pretty console layout
    pub use_json: bool,

    pub include_target: bool,

    /// File and line of the call site
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON records with call-site metadata, for CI jobs that ship logs
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    /// Reads `REMEDIATOR_LOG_LEVEL` and `REMEDIATOR_LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var("REMEDIATOR_LOG_LEVEL")
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = env::var("REMEDIATOR_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a level name case-insensitively
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let filter = EnvFilter::new("warn");
    match format!("{}={}", env!("CARGO_PKG_NAME"), level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter.add_directive(level.into()),
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .try_init();
        } else {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .try_init();
        }
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("Debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" INFO "), Some(Level::INFO));
        assert_eq!(parse_level("warning"), Some(Level::WARN));
        assert_eq!(parse_level("error"), Some(Level::ERROR));
        assert_eq!(parse_level("loud"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
        assert!(!config.include_location);
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert!(config.use_json);
        assert!(config.include_location);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("REMEDIATOR_LOG_LEVEL", "debug");
        env::set_var("REMEDIATOR_LOG_JSON", "true");
        let config = LoggingConfig::from_env();
        env::remove_var("REMEDIATOR_LOG_LEVEL");
        env::remove_var("REMEDIATOR_LOG_JSON");

        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        env::set_var("REMEDIATOR_LOG_LEVEL", "chatty");
        env::set_var("REMEDIATOR_LOG_JSON", "sometimes");
        let config = LoggingConfig::from_env();
        env::remove_var("REMEDIATOR_LOG_LEVEL");
        env::remove_var("REMEDIATOR_LOG_JSON");

        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::production());
    }
}
