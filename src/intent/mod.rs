//! Remediation intent and resource-type classification

mod classifier;
mod model;
mod resource_type;

pub use classifier::{classify_or_default, KeywordClassifier, ResourceClassifier, StaticClassifier};
pub use model::{normalize_repository, RemediationIntent, AFFECTED_RESOURCE_FIELDS};
pub use resource_type::{ResourceType, ResourceTypeSet, GENERIC};
