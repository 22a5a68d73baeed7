use crate::error::{RemediationError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use tracing::debug;

/// Full-file replacements keyed by repository-relative path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProposedChange {
    pub files: BTreeMap<String, String>,
}

impl ProposedChange {
    /// Parses generation output of the form `{"files": {"<path>": "<content>"}}`.
    ///
    /// A surrounding markdown code fence is tolerated. An empty `files`
    /// mapping is valid and means "nothing to change".
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(RemediationError::malformed("empty payload", raw));
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|e| RemediationError::malformed(format!("invalid JSON: {}", e), raw))?;

        let files = match value.get("files") {
            Some(Value::Object(files)) => files,
            Some(_) => {
                return Err(RemediationError::malformed(
                    "`files` must be an object",
                    raw,
                ))
            }
            None if value.is_object() => {
                return Err(RemediationError::malformed(
                    "missing required `files` object",
                    raw,
                ))
            }
            None => return Err(RemediationError::malformed("expected a JSON object", raw)),
        };

        let mut change = ProposedChange::default();
        for (path, content) in files {
            let Some(content) = content.as_str() else {
                return Err(RemediationError::malformed(
                    format!("`files` must map paths to string contents (offending path: {})", path),
                    raw,
                ));
            };
            change.files.insert(path.clone(), content.to_string());
        }

        debug!(files = change.files.len(), "Parsed proposed change");
        Ok(change)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Removes a surrounding markdown code fence (with an optional `json` tag)
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed.trim_matches('`');
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

/// Validates a proposed path and returns its normalized `/`-separated form.
///
/// Absolute paths, drive prefixes and any `..` component are refused; `.`
/// components are dropped, so `./main.tf` and `main.tf` name the same file.
pub fn safe_relative_path(raw: &str) -> Result<String> {
    let unsafe_path = || RemediationError::UnsafePath(raw.to_string());

    if raw.trim().is_empty() || raw.starts_with('/') || raw.starts_with('\\') {
        return Err(unsafe_path());
    }

    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path())
            }
        }
    }

    if parts.is_empty() {
        return Err(unsafe_path());
    }
    Ok(parts.join("/"))
}
