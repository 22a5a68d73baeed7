//! Output formatting for multiple formats
//!
//! JSON and YAML render the same serializable structures the library returns,
//! so `remediator plan --format json` is exactly the generation context. Human
//! output is a summary meant for a terminal.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::RemediatorConfig;
use crate::pipeline::{ApplyOutcome, GenerationContext, RepositoryScan};
use crate::resolver::ModuleReference;
use crate::validation::ValidationVerdict;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";
const BRANCH: &str = "\u{251C}\u{2500}";
const LAST_BRANCH: &str = "\u{2514}\u{2500}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// Serializable summary of a repository scan with repository-relative paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub root: String,
    pub definition_files: Vec<String>,
    pub manifest_files: Vec<String>,
    pub module_files: Vec<String>,
    pub modules: Vec<ModuleSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub declared_in: String,
    pub source: String,
    /// `None` when the source is remote or the directory does not exist
    pub resolved_dir: Option<String>,
}

impl ScanReport {
    pub fn from_scan(scan: &RepositoryScan) -> Self {
        let inventory = &scan.inventory;
        let relative = |paths: &[std::path::PathBuf]| -> Vec<String> {
            paths.iter().map(|p| inventory.relative(p)).collect()
        };
        let summarize = |reference: &ModuleReference| ModuleSummary {
            name: reference.name.clone(),
            declared_in: inventory.relative(&reference.declared_in),
            source: reference.raw_source.clone(),
            resolved_dir: reference
                .resolved_dir
                .as_ref()
                .map(|dir| inventory.relative(dir)),
        };

        Self {
            root: inventory.root.display().to_string(),
            definition_files: relative(&inventory.definition_files),
            manifest_files: relative(&inventory.manifest_files),
            module_files: relative(&inventory.module_files),
            modules: scan.resolution.references.iter().map(summarize).collect(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_scan(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(scan_human(report)),
            _ => self.serialize(report, "scan report"),
        }
    }

    pub fn format_context(&self, context: &GenerationContext) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(context_human(context)),
            _ => self.serialize(context, "generation context"),
        }
    }

    pub fn format_apply(&self, outcome: &ApplyOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(apply_human(outcome)),
            _ => self.serialize(outcome, "apply outcome"),
        }
    }

    pub fn format_verdict(&self, verdict: &ValidationVerdict) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(verdict_human(verdict)),
            _ => self.serialize(verdict, "validation verdict"),
        }
    }

    pub fn format_config(&self, config: &RemediatorConfig) -> Result<String> {
        let map = config.to_display_map();
        match self.format {
            OutputFormat::Human => Ok(config_human(&map)),
            _ => self.serialize(&map, "configuration"),
        }
    }

    fn serialize<T: Serialize>(&self, value: &T, what: &str) -> Result<String> {
        match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .with_context(|| format!("Failed to serialize {} to YAML", what)),
            _ => serde_json::to_string_pretty(value)
                .with_context(|| format!("Failed to serialize {} to JSON", what)),
        }
    }
}

fn header(output: &mut String, title: &str) {
    output.push_str(title);
    output.push('\n');
    output.push_str(RULE);
    output.push_str("\n\n");
}

fn tree(output: &mut String, label: &str, items: &[String]) {
    output.push_str(&format!("{} ({}):\n", label, items.len()));
    if items.is_empty() {
        output.push_str(&format!("{} (none)\n", LAST_BRANCH));
    }
    for (i, item) in items.iter().enumerate() {
        let connector = if i + 1 == items.len() { LAST_BRANCH } else { BRANCH };
        output.push_str(&format!("{} {}\n", connector, item));
    }
    output.push('\n');
}

fn scan_human(report: &ScanReport) -> String {
    let mut output = String::new();
    header(&mut output, "Repository Scan");

    output.push_str(&format!("Root: {}\n\n", report.root));
    tree(&mut output, "Definition files", &report.definition_files);
    tree(&mut output, "Manifest files", &report.manifest_files);

    let modules: Vec<String> = report
        .modules
        .iter()
        .map(|m| match &m.resolved_dir {
            Some(dir) => format!("{} = {} -> {}", m.name, m.source, dir),
            None => format!("{} = {} (not local)", m.name, m.source),
        })
        .collect();
    tree(&mut output, "Module declarations", &modules);
    tree(&mut output, "Module files", &report.module_files);
    output
}

fn context_human(context: &GenerationContext) -> String {
    let mut output = String::new();
    header(&mut output, "Remediation Plan");

    output.push_str(&format!("Ticket:         {}\n", context.intent.ticket_id()));
    if let Some(repo) = context.intent.repo() {
        output.push_str(&format!("Repository:     {}\n", repo));
    }
    output.push_str(&format!("Resource type:  {}\n", context.resource_type));
    output.push_str(&format!("Selected by:    {}\n\n", context.selection_tier));

    tree(&mut output, "Affected resources", &context.affected_resources);
    tree(&mut output, "Matched files", &context.matched_files);
    tree(&mut output, "Related files", &context.related_files);

    let candidates: Vec<String> = context
        .candidate_files
        .iter()
        .map(|path| {
            let chars = context
                .candidate_file_contents
                .get(path)
                .map(|c| c.chars().count())
                .unwrap_or(0);
            format!("{} ({} chars)", path, chars)
        })
        .collect();
    tree(&mut output, "Context files", &candidates);

    if context.truncated {
        output.push_str("\u{26A0} Context budget reached; some candidates were left out\n");
    }
    output
}

fn apply_human(outcome: &ApplyOutcome) -> String {
    let mut output = String::new();
    header(&mut output, "\u{2713} Change Applied");

    tree(&mut output, "Written files", &outcome.written_files);
    tree(&mut output, "Changed files", &outcome.changed_files);

    output.push_str("Pull Request Draft:\n");
    output.push_str(&format!("{} Title:   {}\n", BRANCH, outcome.draft.title));
    output.push_str(&format!(
        "{} Branch:  {}\n",
        BRANCH,
        outcome.draft.branch.as_deref().unwrap_or("(unset)")
    ));
    output.push_str(&format!(
        "{} Commit:  {}\n\n",
        LAST_BRANCH, outcome.draft.commit_message
    ));
    output.push_str(&outcome.draft.body);
    output.push('\n');
    output
}

fn verdict_human(verdict: &ValidationVerdict) -> String {
    let mut output = String::new();
    if verdict.passed {
        output.push_str(&format!("\u{2713} {}: no critical content removed\n", verdict.path));
    } else {
        output.push_str(&format!("\u{2717} {}: rejected\n", verdict.path));
        for reason in &verdict.reasons {
            output.push_str(&format!("  - {}\n", reason));
        }
    }
    output
}

fn config_human(map: &BTreeMap<String, String>) -> String {
    let mut output = String::new();
    header(&mut output, "remediator Configuration");

    for (key, value) in map {
        output.push_str(&format!("  {:<18} {}\n", key, value));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{RemediationIntent, ResourceType};
    use crate::pipeline::PullRequestDraft;
    use crate::selection::SelectionTier;

    fn context() -> GenerationContext {
        GenerationContext {
            intent: serde_json::from_str(r#"{"jira_id": "SEC-7", "repo": "acme/infra"}"#).unwrap(),
            resource_type: ResourceType::new("s3"),
            selection_tier: SelectionTier::ResourceTypeMatch,
            affected_resources: vec![],
            matched_files: vec![],
            related_files: vec!["s3.tf".to_string()],
            module_source_dirs: vec![],
            candidate_files: vec!["s3.tf".to_string()],
            candidate_file_contents: BTreeMap::from([(
                "s3.tf".to_string(),
                "locals {}".to_string(),
            )]),
            truncated: true,
        }
    }

    #[test]
    fn test_context_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_context(&context())
            .unwrap();
        assert!(output.contains("Ticket:         SEC-7"));
        assert!(output.contains("Selected by:    tier 2"));
        assert!(output.contains("s3.tf (9 chars)"));
        assert!(output.contains("Affected resources (0):"));
        assert!(output.contains("Context budget reached"));
    }

    #[test]
    fn test_context_json_is_the_context() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_context(&context())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["intent"]["jira_id"], "SEC-7");
        assert_eq!(value["candidate_files"][0], "s3.tf");
    }

    #[test]
    fn test_context_yaml() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_context(&context())
            .unwrap();
        assert!(output.contains("selection_tier: resource_type_match"));
    }

    #[test]
    fn test_verdict_human() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let rejected = ValidationVerdict {
            path: "main.tf".to_string(),
            passed: false,
            reasons: vec!["Removed 1 module block(s)".to_string()],
        };
        let output = formatter.format_verdict(&rejected).unwrap();
        assert!(output.starts_with("\u{2717} main.tf: rejected"));
        assert!(output.contains("  - Removed 1 module block(s)"));

        let passed = ValidationVerdict {
            path: "main.tf".to_string(),
            passed: true,
            reasons: vec![],
        };
        assert!(formatter
            .format_verdict(&passed)
            .unwrap()
            .contains("no critical content removed"));
    }

    #[test]
    fn test_apply_human() {
        let intent: RemediationIntent =
            serde_json::from_str(r#"{"repo": "acme/infra", "branch": "remediate-sec-7"}"#).unwrap();
        let outcome = ApplyOutcome {
            written_files: vec!["s3.tf".to_string()],
            changed_files: vec!["s3.tf".to_string()],
            draft: PullRequestDraft::new(&intent, &["s3.tf".to_string()]),
        };
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_apply(&outcome)
            .unwrap();
        assert!(output.contains("Branch:  remediate-sec-7"));
        assert!(output.contains("Commit:  Automated fix from Jira intent"));
        assert!(output.contains("Changed files:\ns3.tf"));
    }
}
