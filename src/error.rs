//! Error taxonomy for a remediation run
//!
//! Every variant is terminal for the run that raised it. Nothing in the core
//! retries; callers decide whether re-running with a different repository or
//! regenerated payload is worthwhile.

use crate::config::ConfigError;
use crate::validation::ValidationVerdict;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of characters of a raw payload kept for diagnostics
pub const PAYLOAD_PREFIX_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error("Repository path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Repository path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error(
        "No infrastructure definition or manifest files were found in {0}. \
         Expected at least one of: *.tf, *.tfvars, *.hcl"
    )]
    DiscoveryEmpty(PathBuf),

    #[error(
        "None of the affected {resource_type} resources were found, and no {resource_type}-related \
         files or modules were detected. Scanned {definition_files} definition files and \
         {manifest_files} manifest files; module sources declared at root: {module_sources:?}"
    )]
    NoAffectedFilesMatched {
        resource_type: String,
        definition_files: usize,
        manifest_files: usize,
        module_sources: Vec<String>,
    },

    #[error(
        "No candidate files to analyze: {definition_files} definition files, \
         {related_files} {resource_type}-related files, {module_files} module files"
    )]
    NoCandidateFiles {
        resource_type: String,
        definition_files: usize,
        related_files: usize,
        module_files: usize,
    },

    #[error("Malformed change payload: {reason} (payload starts with: {payload_prefix:?})")]
    MalformedChangePayload {
        reason: String,
        payload_prefix: String,
    },

    #[error("Refusing unsafe change path {0:?}: must be relative and stay inside the repository")]
    UnsafePath(String),

    /// One verdict per sensitive file that failed validation
    #[error("Proposed replacement removes critical content: {}", describe_rejections(rejections))]
    StructuralLossRejected { rejections: Vec<ValidationVerdict> },

    #[error("No code changes were produced; refusing to open an empty pull request")]
    EmptyDiff,

    #[error("Intent is missing a repository (expected `owner/name` or a repository URL)")]
    MissingRepository,

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    #[error("File access failed for {path}: {message}")]
    FileAccess { path: PathBuf, message: String },

    #[error("Version control error: {0}")]
    Vcs(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RemediationError {
    pub fn file_access(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        RemediationError::FileAccess {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }

    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        RemediationError::MalformedChangePayload {
            reason: reason.into(),
            payload_prefix: raw.chars().take(PAYLOAD_PREFIX_CHARS).collect(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RemediationError>;

fn describe_rejections(rejections: &[ValidationVerdict]) -> String {
    rejections
        .iter()
        .map(|v| format!("{} ({})", v.path, v.reasons.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_keeps_prefix_only() {
        let raw = "x".repeat(2_000);
        match RemediationError::malformed("bad json", &raw) {
            RemediationError::MalformedChangePayload {
                reason,
                payload_prefix,
            } => {
                assert_eq!(reason, "bad json");
                assert_eq!(payload_prefix.chars().count(), PAYLOAD_PREFIX_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_structural_loss_lists_every_file() {
        let err = RemediationError::StructuralLossRejected {
            rejections: vec![
                ValidationVerdict {
                    path: "main.tf".to_string(),
                    passed: false,
                    reasons: vec![
                        "Removed 1 module block(s)".to_string(),
                        "Removed output definitions".to_string(),
                    ],
                },
                ValidationVerdict {
                    path: "providers.tf".to_string(),
                    passed: false,
                    reasons: vec!["Removed provider configuration".to_string()],
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Proposed replacement removes critical content: \
             main.tf (Removed 1 module block(s), Removed output definitions); \
             providers.tf (Removed provider configuration)"
        );
    }

    #[test]
    fn test_no_affected_files_message_has_counts() {
        let err = RemediationError::NoAffectedFilesMatched {
            resource_type: "s3".to_string(),
            definition_files: 7,
            manifest_files: 2,
            module_sources: vec!["git::https://example.com/m.git".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Scanned 7 definition files"));
        assert!(msg.contains("2 manifest files"));
        assert!(msg.contains("git::https://example.com/m.git"));
    }
}
