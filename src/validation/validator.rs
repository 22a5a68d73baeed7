use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::validation::rules::{
    BackendBlockRule, FileComparison, ModuleCountRule, OutputsRule, ProviderBlockRule,
    ResourcesRule, SizeRatioRule, ValidationRule, VariablesRule,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_MIN_SIZE_RATIO: f64 = 0.5;
const DEFAULT_SENSITIVE_FILES: &[&str] = &["main.tf", "terraform.tf", "providers.tf"];

/// Which files are guarded and how much shrinkage is tolerated
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationPolicy {
    /// Repository-relative paths (root-level filenames) that must pass the rules
    pub sensitive_files: Vec<String>,
    pub min_size_ratio: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            sensitive_files: DEFAULT_SENSITIVE_FILES.iter().map(|s| s.to_string()).collect(),
            min_size_ratio: DEFAULT_MIN_SIZE_RATIO,
        }
    }
}

impl ValidationPolicy {
    pub fn is_sensitive(&self, relative_path: &str) -> bool {
        self.sensitive_files.iter().any(|f| f == relative_path)
    }
}

/// Outcome of validating one proposed replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub path: String,
    pub passed: bool,
    pub reasons: Vec<String>,
}

impl ValidationVerdict {
    pub fn is_rejected(&self) -> bool {
        !self.passed
    }
}

/// Runs every rule against a proposed replacement and collects all reasons
pub struct ChangeValidator {
    rules: Vec<Box<dyn ValidationRule>>,
    policy: ValidationPolicy,
    progress: Arc<dyn ProgressHandler>,
}

impl ChangeValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        let rules: Vec<Box<dyn ValidationRule>> = vec![
            Box::new(ModuleCountRule),
            Box::new(BackendBlockRule),
            Box::new(ProviderBlockRule),
            Box::new(VariablesRule),
            Box::new(OutputsRule),
            Box::new(ResourcesRule),
            Box::new(SizeRatioRule {
                min_ratio: policy.min_size_ratio,
            }),
        ];
        Self {
            rules,
            policy,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_rules(policy: ValidationPolicy, rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self {
            rules,
            policy,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate(&self, path: &str, original: &str, proposed: &str) -> ValidationVerdict {
        let comparison = FileComparison::new(original, proposed);

        let reasons: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| match rule.validate(&comparison) {
                Ok(()) => None,
                Err(e) => {
                    debug!(rule = rule.name(), path, reason = %e, "Validation rule failed");
                    Some(e.to_string())
                }
            })
            .collect();

        let verdict = ValidationVerdict {
            path: path.to_string(),
            passed: reasons.is_empty(),
            reasons,
        };

        if verdict.is_rejected() {
            warn!(
                path,
                reasons = %verdict.reasons.join(", "),
                "Proposed replacement removes critical content"
            );
        }
        self.progress.on_progress(&ProgressEvent::ValidationComplete {
            path: verdict.path.clone(),
            passed: verdict.passed,
            reasons: verdict.reasons.clone(),
        });

        verdict
    }
}

impl Default for ChangeValidator {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingHandler;

    #[test]
    fn test_module_decrease_is_rejected() {
        let original = "module \"x\" {}\nmodule \"y\" {}\n";
        let proposed = "module \"x\" {}\n# y removed\n";

        let verdict = ChangeValidator::default().validate("main.tf", original, proposed);
        assert!(!verdict.passed);
        assert!(verdict.reasons.iter().any(|r| r.contains("module block")));
    }

    #[test]
    fn test_truncation_is_rejected() {
        let original = format!("locals {{\n  data = \"{}\"\n}}\n", "a".repeat(977));
        let proposed: String = original.chars().take(400).collect();
        assert_eq!(original.chars().count(), 1000);

        let verdict = ChangeValidator::default().validate("main.tf", &original, &proposed);
        assert!(!verdict.passed);
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r.starts_with("File size reduced by 60%")));
    }

    #[test]
    fn test_rewriting_empty_sensitive_file_is_rejected() {
        let verdict =
            ChangeValidator::default().validate("main.tf", "", "resource \"a\" \"b\" {}\n");
        assert!(!verdict.passed);
        assert_eq!(verdict.reasons, vec!["File size reduced by 100% (likely truncated)"]);
    }

    #[test]
    fn test_all_reasons_are_collected() {
        let original = "terraform {}\nprovider \"aws\" {}\nvariable \"a\" {}\noutput \"b\" {}\n";
        let verdict = ChangeValidator::default().validate("main.tf", original, "");

        assert_eq!(
            verdict.reasons,
            vec![
                "Removed terraform backend configuration",
                "Removed provider configuration",
                "Removed variable definitions",
                "Removed output definitions",
                "File size reduced by 100% (likely truncated)",
            ]
        );
    }

    #[test]
    fn test_additive_change_passes() {
        let original = "resource \"aws_s3_bucket\" \"b\" {\n  bucket = \"logs\"\n}\n";
        let proposed = format!(
            "{}\nresource \"aws_s3_bucket_public_access_block\" \"b\" {{\n  bucket = aws_s3_bucket.b.id\n}}\n",
            original
        );
        let recorder = Arc::new(RecordingHandler::new());
        let verdict = ChangeValidator::default()
            .with_progress(recorder.clone())
            .validate("main.tf", original, &proposed);

        assert!(verdict.passed);
        assert_eq!(
            recorder.events(),
            vec![ProgressEvent::ValidationComplete {
                path: "main.tf".to_string(),
                passed: true,
                reasons: vec![],
            }]
        );
    }

    #[test]
    fn test_custom_ratio() {
        let policy = ValidationPolicy {
            min_size_ratio: 0.9,
            ..Default::default()
        };
        let original = "x".repeat(100);
        let verdict = ChangeValidator::new(policy).validate("main.tf", &original, &original[..85]);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_custom_rule_set() {
        let validator = ChangeValidator::with_rules(
            ValidationPolicy::default(),
            vec![Box::new(crate::validation::rules::ModuleCountRule)],
        );
        let verdict = validator.validate("main.tf", "module \"a\" {}\nmodule \"b\" {}\n", "");
        assert_eq!(verdict.reasons, vec!["Removed 2 module block(s)"]);
    }

    #[test]
    fn test_policy_sensitivity() {
        let policy = ValidationPolicy::default();
        assert!(policy.is_sensitive("providers.tf"));
        assert!(!policy.is_sensitive("modules/s3/main.tf"));
        assert!(!policy.is_sensitive("variables.tf"));
    }
}
