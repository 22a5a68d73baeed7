use crate::intent::{RemediationIntent, ResourceType};
use crate::selection::SelectionTier;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the generation step receives. All paths are
/// repository-relative with `/` separators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationContext {
    pub intent: RemediationIntent,
    pub resource_type: ResourceType,
    pub selection_tier: SelectionTier,
    pub affected_resources: Vec<String>,
    pub matched_files: Vec<String>,
    pub related_files: Vec<String>,
    pub module_source_dirs: Vec<String>,
    /// Files whose contents made it into the budget, in selection order
    pub candidate_files: Vec<String>,
    pub candidate_file_contents: BTreeMap<String, String>,
    pub truncated: bool,
}

impl GenerationContext {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

const DRAFT_TITLE: &str = "Automated remediation";
const DRAFT_COMMIT_MESSAGE: &str = "Automated fix from Jira intent";

/// Title, body and branch for the pull request that carries a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    pub branch: Option<String>,
    pub commit_message: String,
    pub body: String,
}

impl PullRequestDraft {
    pub fn new(intent: &RemediationIntent, changed_files: &[String]) -> Self {
        let body = format!(
            "Automated remediation PR generated from Jira intent.\n\n\
             Changed files:\n{}\n\n\
             Intent:\n{}",
            changed_files.join("\n"),
            intent.to_pretty_json()
        );
        Self {
            title: DRAFT_TITLE.to_string(),
            branch: intent.branch().map(String::from),
            commit_message: DRAFT_COMMIT_MESSAGE.to_string(),
            body,
        }
    }
}

/// Result of writing a proposed change into the checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Paths the applier wrote
    pub written_files: Vec<String>,
    /// Paths the VCS reports as changed afterwards
    pub changed_files: Vec<String>,
    pub draft: PullRequestDraft,
}
