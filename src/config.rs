//! Configuration management for remediator
//!
//! Settings are loaded from environment variables with sensible defaults. The
//! heuristic knobs (file budget, structural-loss ratio, sensitive filenames,
//! supported resource types) live here rather than as constants so that a
//! deployment can tune them without a rebuild.
//!
//! # Environment Variables
//!
//! - `REMEDIATOR_LOG_LEVEL`: Logging level - default: "info"
//! - `REMEDIATOR_MAX_FILES`: Max candidate files sent downstream - default: "50"
//! - `REMEDIATOR_MAX_CONTEXT_CHARS`: Combined character budget - default: "200000"
//! - `REMEDIATOR_MIN_SIZE_RATIO`: Rewrites below this size ratio are rejected - default: "0.5"
//! - `REMEDIATOR_SENSITIVE_FILES`: Comma-separated root filenames guarded by the
//!   structural-loss validator - default: "main.tf,terraform.tf,providers.tf"
//! - `REMEDIATOR_RESOURCE_TYPES`: Comma-separated supported resource types -
//!   default: "s3,ec2,kms,rds,lambda,iam,vpc"
//! - `REMEDIATOR_PROVIDER_PREFIX`: Provider marker prepended to the resource type when
//!   looking for related files - default: "aws_"
//!
//! # Example
//!
//! ```no_run
//! use remediator::RemediatorConfig;
//!
//! let config = RemediatorConfig::default();
//! config.validate().expect("Invalid configuration");
//! let limits = config.selection_limits();
//! assert!(limits.max_files > 0);
//! ```

use crate::intent::ResourceTypeSet;
use crate::selection::SelectionLimits;
use crate::validation::ValidationPolicy;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_FILES: usize = 50;
const DEFAULT_MAX_CONTEXT_CHARS: usize = 200_000;
const DEFAULT_MIN_SIZE_RATIO: f64 = 0.5;
const DEFAULT_SENSITIVE_FILES: &[&str] = &["main.tf", "terraform.tf", "providers.tf"];
const DEFAULT_RESOURCE_TYPES: &[&str] = &["s3", "ec2", "kms", "rds", "lambda", "iam", "vpc"];
const DEFAULT_PROVIDER_PREFIX: &str = "aws_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for remediator
#[derive(Debug, Clone)]
pub struct RemediatorConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Maximum number of candidate files whose contents are sent downstream
    pub max_files: usize,

    /// Combined character budget across all candidate file contents
    pub max_context_chars: usize,

    /// Proposed/original length ratio below which a rewrite counts as truncated
    pub min_size_ratio: f64,

    /// Root-level filenames whose replacements must pass structural-loss checks
    pub sensitive_files: Vec<String>,

    /// Supported resource type tags (without the catch-all `generic`)
    pub resource_types: Vec<String>,

    /// Provider marker, e.g. `aws_` in `aws_s3_bucket`
    pub provider_prefix: String,
}

impl Default for RemediatorConfig {
    /// Creates a new configuration by loading from environment variables with defaults
    fn default() -> Self {
        let log_level = env::var("REMEDIATOR_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let max_files = env::var("REMEDIATOR_MAX_FILES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILES);

        let max_context_chars = env::var("REMEDIATOR_MAX_CONTEXT_CHARS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_CONTEXT_CHARS);

        let min_size_ratio = env::var("REMEDIATOR_MIN_SIZE_RATIO")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_MIN_SIZE_RATIO);

        let sensitive_files = env::var("REMEDIATOR_SENSITIVE_FILES")
            .ok()
            .map(|v| split_list(&v))
            .unwrap_or_else(|| to_owned_list(DEFAULT_SENSITIVE_FILES));

        let resource_types = env::var("REMEDIATOR_RESOURCE_TYPES")
            .ok()
            .map(|v| {
                split_list(&v)
                    .into_iter()
                    .map(|t| t.to_lowercase())
                    .collect()
            })
            .unwrap_or_else(|| to_owned_list(DEFAULT_RESOURCE_TYPES));

        let provider_prefix = env::var("REMEDIATOR_PROVIDER_PREFIX")
            .unwrap_or_else(|_| DEFAULT_PROVIDER_PREFIX.to_string());

        Self {
            log_level,
            max_files,
            max_context_chars,
            min_size_ratio,
            sensitive_files,
            resource_types,
            provider_prefix,
        }
    }
}

impl RemediatorConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max files must be at least 1".to_string(),
            ));
        }

        if self.max_context_chars == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max context characters must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.min_size_ratio) {
            return Err(ConfigError::ValidationFailed(format!(
                "Min size ratio must be within [0, 1], got {}",
                self.min_size_ratio
            )));
        }

        if let Some(bad) = self
            .sensitive_files
            .iter()
            .find(|name| name.contains('/') || name.contains('\\'))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Sensitive file entries must be bare root filenames, got {:?}",
                bad
            )));
        }

        if let Some(bad) = self
            .resource_types
            .iter()
            .find(|t| t.is_empty() || !t.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Resource types must be lowercase tokens, got {:?}",
                bad
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn selection_limits(&self) -> SelectionLimits {
        SelectionLimits {
            max_files: self.max_files,
            max_total_chars: self.max_context_chars,
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            sensitive_files: self.sensitive_files.clone(),
            min_size_ratio: self.min_size_ratio,
        }
    }

    pub fn resource_type_set(&self) -> ResourceTypeSet {
        ResourceTypeSet::new(self.resource_types.iter().cloned())
    }

    /// Flat key/value view used by `remediator config`
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("log_level".to_string(), self.log_level.clone()),
            ("max_files".to_string(), self.max_files.to_string()),
            ("max_context_chars".to_string(), self.max_context_chars.to_string()),
            ("min_size_ratio".to_string(), self.min_size_ratio.to_string()),
            ("sensitive_files".to_string(), self.sensitive_files.join(",")),
            ("resource_types".to_string(), self.resource_types.join(",")),
            ("provider_prefix".to_string(), self.provider_prefix.clone()),
        ])
    }
}

impl fmt::Display for RemediatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Remediator Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Max Files: {}", self.max_files)?;
        writeln!(f, "  Max Context Chars: {}", self.max_context_chars)?;
        writeln!(f, "  Min Size Ratio: {}", self.min_size_ratio)?;
        writeln!(f, "  Sensitive Files: {}", self.sensitive_files.join(", "))?;
        writeln!(f, "  Resource Types: {}", self.resource_types.join(", "))?;
        write!(f, "  Provider Prefix: {}", self.provider_prefix)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
