use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const GENERIC: &str = "generic";

/// Lowercase resource category tag such as `s3` or `kms`, or `generic`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    pub fn generic() -> Self {
        Self(GENERIC.to_string())
    }

    pub fn is_generic(&self) -> bool {
        self.0 == GENERIC
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResourceType {
    fn default() -> Self {
        Self::generic()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The configured set of supported resource types, in preference order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeSet {
    types: Vec<String>,
}

impl ResourceTypeSet {
    pub fn new(types: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for tag in types {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && tag != GENERIC && !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        Self { types: unique }
    }

    pub fn contains(&self, tag: &str) -> bool {
        tag == GENERIC || self.types.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Accepts a supported token; anything else becomes `generic`
    pub fn parse(&self, raw: &str) -> ResourceType {
        let candidate = ResourceType::new(raw);
        if self.contains(candidate.as_str()) {
            candidate
        } else {
            warn!(
                resource_type = raw,
                "Unsupported resource type, defaulting to generic"
            );
            ResourceType::generic()
        }
    }
}

impl fmt::Display for ResourceTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.types.join(", "))
    }
}
