use super::model::RemediationIntent;
use super::resource_type::{ResourceType, ResourceTypeSet};
use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

/// Maps an intent to the resource category it remediates
pub trait ResourceClassifier: Send + Sync {
    fn classify(&self, intent: &RemediationIntent, supported: &ResourceTypeSet) -> Result<ResourceType>;

    fn name(&self) -> &str;
}

/// Always answers with the same tag, e.g. from `--resource-type`
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    resource_type: ResourceType,
}

impl StaticClassifier {
    pub fn new(resource_type: ResourceType) -> Self {
        Self { resource_type }
    }
}

impl ResourceClassifier for StaticClassifier {
    fn classify(&self, _intent: &RemediationIntent, _supported: &ResourceTypeSet) -> Result<ResourceType> {
        Ok(self.resource_type.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Scores each supported type by keyword hits in the intent text.
///
/// Keywords must sit between non-alphanumeric characters, so `aws_kms_key`
/// counts for `kms` while `kmsx` does not. The type tag always counts; a few
/// well-known types also carry service vocabulary. Ties go to the type listed
/// first.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn keywords(tag: &str) -> &'static [&'static str] {
        match tag {
            "s3" => &["bucket", "buckets", "public access", "object lock"],
            "ec2" => &["instance", "instances", "imdsv2", "ami", "ebs"],
            "kms" => &["key rotation", "cmk", "customer managed key"],
            "rds" => &["database", "databases", "db instance", "backup retention"],
            "lambda" => &["function", "functions", "runtime"],
            "iam" => &["role", "roles", "policy", "policies", "mfa"],
            "vpc" => &["subnet", "subnets", "security group", "flow logs"],
            _ => &[],
        }
    }

    fn pattern(tag: &str) -> Result<Regex> {
        let mut terms = vec![regex::escape(tag)];
        terms.extend(Self::keywords(tag).iter().map(|k| regex::escape(k)));
        let source = format!(r"(?i)(?:^|[^a-z0-9])(?:{})(?:[^a-z0-9]|$)", terms.join("|"));
        Regex::new(&source).with_context(|| format!("Invalid keyword pattern for {}", tag))
    }
}

impl ResourceClassifier for KeywordClassifier {
    fn classify(&self, intent: &RemediationIntent, supported: &ResourceTypeSet) -> Result<ResourceType> {
        let text = serde_json::to_string(intent.fields()).context("Failed to render intent")?;

        let mut best: Option<(&str, usize)> = None;
        for tag in supported.iter() {
            let hits = Self::pattern(tag)?.find_iter(&text).count();
            debug!(resource_type = tag, hits, "Keyword score");
            if hits > 0 && best.map(|(_, top)| hits > top).unwrap_or(true) {
                best = Some((tag, hits));
            }
        }

        Ok(best
            .map(|(tag, _)| ResourceType::new(tag))
            .unwrap_or_else(ResourceType::generic))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Runs `classifier`, falling back to `generic` on error or on a tag outside
/// the supported set. Classification never fails a run.
pub fn classify_or_default(
    classifier: &dyn ResourceClassifier,
    intent: &RemediationIntent,
    supported: &ResourceTypeSet,
) -> ResourceType {
    match classifier.classify(intent, supported) {
        Ok(tag) if supported.contains(tag.as_str()) => {
            info!(classifier = classifier.name(), resource_type = %tag, "Classified intent");
            tag
        }
        Ok(tag) => {
            warn!(
                classifier = classifier.name(),
                resource_type = %tag,
                "Classifier returned an unsupported type, defaulting to generic"
            );
            ResourceType::generic()
        }
        Err(err) => {
            warn!(
                classifier = classifier.name(),
                error = %err,
                "Classification failed, defaulting to generic"
            );
            ResourceType::generic()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingClassifier;

    impl ResourceClassifier for FailingClassifier {
        fn classify(&self, _: &RemediationIntent, _: &ResourceTypeSet) -> Result<ResourceType> {
            anyhow::bail!("backend unavailable")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn supported() -> ResourceTypeSet {
        ResourceTypeSet::new(["s3", "ec2", "kms", "rds"].map(String::from))
    }

    fn intent(value: serde_json::Value) -> RemediationIntent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_keyword_classifier_picks_highest_score() {
        let i = intent(json!({
            "summary": "S3 buckets without encryption",
            "Affected Buckets": ["logs", "assets"],
            "notes": "uses a KMS key"
        }));
        let tag = KeywordClassifier::new().classify(&i, &supported()).unwrap();
        assert_eq!(tag.as_str(), "s3");
    }

    #[test]
    fn test_keyword_classifier_requires_whole_words() {
        let i = intent(json!({ "summary": "rds2 kmsx ec22" }));
        let tag = KeywordClassifier::new().classify(&i, &supported()).unwrap();
        assert!(tag.is_generic());
    }

    #[test]
    fn test_keyword_classifier_matches_provider_names() {
        let i = intent(json!({ "resource": "aws_kms_key.main" }));
        let tag = KeywordClassifier::new().classify(&i, &supported()).unwrap();
        assert_eq!(tag.as_str(), "kms");
    }

    #[test]
    fn test_failure_defaults_to_generic() {
        let tag = classify_or_default(&FailingClassifier, &RemediationIntent::default(), &supported());
        assert!(tag.is_generic());
    }

    #[test]
    fn test_unsupported_answer_defaults_to_generic() {
        let classifier = StaticClassifier::new(ResourceType::new("dynamodb"));
        let tag = classify_or_default(&classifier, &RemediationIntent::default(), &supported());
        assert!(tag.is_generic());
    }

    #[test]
    fn test_static_classifier() {
        let classifier = StaticClassifier::new(ResourceType::new("rds"));
        let tag = classify_or_default(&classifier, &RemediationIntent::default(), &supported());
        assert_eq!(tag.as_str(), "rds");
    }
}
