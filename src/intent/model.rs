use crate::changes::strip_code_fence;
use crate::error::{RemediationError, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use tracing::debug;

/// Intent fields that may carry the affected resource identifiers, in lookup order
pub const AFFECTED_RESOURCE_FIELDS: &[&str] = &[
    "Affected Buckets",
    "affected_buckets",
    "Affected Resources",
    "affected_resources",
    "Affected Instances",
    "affected_instances",
    "Affected Keys",
    "affected_keys",
    "Affected Databases",
    "affected_databases",
];

/// Top-level fields that may name the target repository, after `repo` and the
/// `description` mapping
const REPOSITORY_FIELDS: &[&str] = &["Repository", "Repository link", "Github Link", "GitHub Link"];
const DESCRIPTION_REPOSITORY_FIELDS: &[&str] = &["repo", "Repository", "Repository link"];

const UNKNOWN_TICKET: &str = "unknown";

/// A structured remediation request.
///
/// The payload is free-form: only `repo`, `branch`, `jira_id` and the
/// affected-resource fields have meaning here; everything else is carried
/// through to the generation context untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemediationIntent {
    fields: Map<String, Value>,
}

impl RemediationIntent {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parses intent JSON, tolerating a surrounding markdown code fence
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(RemediationError::InvalidIntent(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(RemediationError::InvalidIntent(e.to_string())),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn ticket_id(&self) -> &str {
        self.get_str("jira_id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_TICKET)
    }

    pub fn repo(&self) -> Option<&str> {
        self.get_str("repo")
    }

    pub fn branch(&self) -> Option<&str> {
        self.get_str("branch")
    }

    /// Fills in `repo` (as `owner/name`) and a default `branch`.
    ///
    /// Fails with `MissingRepository` when no repository alias holds a
    /// usable value.
    pub fn normalize(mut self) -> Result<Self> {
        let repo = self
            .repository_candidates()
            .into_iter()
            .find_map(normalize_repository)
            .ok_or(RemediationError::MissingRepository)?;
        debug!(repo = %repo, "Resolved intent repository");
        self.set("repo", repo);

        if self.branch().map(str::is_empty).unwrap_or(true) {
            let branch = format!("remediate-{}", self.ticket_id().to_lowercase());
            self.set("branch", branch);
        }

        Ok(self)
    }

    /// Replaces the branch with `YYYY-MM-DD-HHMMSS-<TICKET>`
    pub fn with_timestamped_branch<Tz>(mut self, now: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let branch = format!(
            "{}-{}",
            now.format("%Y-%m-%d-%H%M%S"),
            self.ticket_id().to_uppercase()
        );
        self.set("branch", branch);
        self
    }

    /// Identifiers of the affected resources.
    ///
    /// The first well-known field holding a non-empty list wins; a mapping is
    /// searched one level deep for its first list value. Entries are trimmed
    /// and blanks dropped.
    pub fn affected_resources(&self) -> Vec<String> {
        for field in AFFECTED_RESOURCE_FIELDS {
            match self.fields.get(*field) {
                Some(Value::Array(items)) if !items.is_empty() => return clean_identifiers(items),
                Some(Value::Object(nested)) => {
                    if let Some(items) = nested.values().find_map(Value::as_array) {
                        return clean_identifiers(items);
                    }
                }
                _ => {}
            }
        }
        Vec::new()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    fn repository_candidates(&self) -> Vec<&str> {
        let mut candidates = Vec::new();
        candidates.extend(self.get_str("repo"));

        if let Some(Value::Object(description)) = self.fields.get("description") {
            candidates.extend(
                DESCRIPTION_REPOSITORY_FIELDS
                    .iter()
                    .filter_map(|f| description.get(*f).and_then(Value::as_str)),
            );
        }

        candidates.extend(REPOSITORY_FIELDS.iter().filter_map(|f| self.get_str(f)));
        candidates
    }
}

/// Reduces a repository reference to `owner/name`.
///
/// URL forms keep whatever follows `github.com/`, minus `.git` and surrounding
/// slashes. Returns `None` for blank input.
pub fn normalize_repository(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let repo = if trimmed.starts_with("http") {
        let tail = trimmed.rsplit("github.com/").next().unwrap_or(trimmed);
        tail.replace(".git", "").trim_matches('/').to_string()
    } else {
        trimmed.to_string()
    };
    (!repo.is_empty()).then_some(repo)
}

fn clean_identifiers(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
