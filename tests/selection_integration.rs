//! Candidate selection against real checkouts on disk

mod support;

use remediator::error::RemediationError;
use remediator::intent::{RemediationIntent, StaticClassifier};
use remediator::progress::{ProgressEvent, RecordingHandler};
use remediator::selection::SelectionTier;
use remediator::{RemediationPlanner, RemediatorConfig, ResourceType};
use std::sync::Arc;
use support::{intent_json, TerraformRepo};

fn config() -> RemediatorConfig {
    RemediatorConfig {
        log_level: "info".to_string(),
        max_files: 50,
        max_context_chars: 200_000,
        min_size_ratio: 0.5,
        sensitive_files: vec![
            "main.tf".to_string(),
            "terraform.tf".to_string(),
            "providers.tf".to_string(),
        ],
        resource_types: vec!["s3".to_string(), "kms".to_string(), "vpc".to_string()],
        provider_prefix: "aws_".to_string(),
    }
}

fn intent(affected: &[&str]) -> RemediationIntent {
    RemediationIntent::parse(&intent_json(affected)).unwrap()
}

fn s3_planner() -> RemediationPlanner {
    RemediationPlanner::new(config())
        .with_classifier(Box::new(StaticClassifier::new(ResourceType::new("s3"))))
}

#[test]
fn test_scan_resolves_templated_module_source() {
    let repo = TerraformRepo::standard();
    let scan = RemediationPlanner::new(config()).scan(repo.path()).unwrap();

    let relative: Vec<String> = scan
        .inventory
        .definition_files
        .iter()
        .map(|p| scan.inventory.relative(p))
        .collect();
    assert!(relative.contains(&"main.tf".to_string()));
    assert!(relative.contains(&"envs/prod.tfvars".to_string()));
    assert!(
        !relative.iter().any(|p| p.starts_with(".terraform/")),
        "cached modules must not be scanned: {relative:?}"
    );

    assert_eq!(scan.resolution.references.len(), 2);
    assert_eq!(scan.resolution.source_dirs.len(), 1);
    assert!(scan.resolution.source_dirs[0].ends_with("modules/s3"));
    assert_eq!(scan.inventory.module_files.len(), 2);
}

#[test]
fn test_named_resource_selects_file_and_siblings() {
    let repo = TerraformRepo::standard();
    let plan = s3_planner()
        .plan(repo.path(), &intent(&["logs-bucket"]))
        .unwrap();

    assert_eq!(plan.context.selection_tier, SelectionTier::ResourceNameMatch);
    assert_eq!(plan.context.matched_files, vec!["main.tf"]);
    assert_eq!(plan.context.candidate_files.len(), 2);
    assert_eq!(plan.context.candidate_files[0], "main.tf");
    assert!(plan
        .context
        .candidate_files
        .contains(&"variables.tf".to_string()));
    assert_eq!(plan.context.module_source_dirs, vec!["modules/s3"]);
    assert_eq!(plan.context.candidate_file_contents["main.tf"], support::MAIN_TF);
    assert!(!plan.context.truncated);
}

#[test]
fn test_unmatched_identifier_falls_back_to_type_match() {
    let repo = TerraformRepo::standard();
    let plan = s3_planner()
        .plan(repo.path(), &intent(&["archive-bucket"]))
        .unwrap();

    assert_eq!(plan.context.selection_tier, SelectionTier::ResourceTypeMatch);
    assert!(plan.context.matched_files.is_empty());
    assert!(plan
        .context
        .candidate_files
        .contains(&"modules/s3/main.tf".to_string()));
}

#[test]
fn test_no_identifiers_uses_module_fallback() {
    let repo = TerraformRepo::standard();
    let plan = RemediationPlanner::new(config())
        .plan(repo.path(), &intent(&[]))
        .unwrap();

    assert_eq!(plan.resource_type.as_str(), "s3");
    assert_eq!(plan.context.selection_tier, SelectionTier::ModuleFallback);
    let candidates = &plan.context.candidate_files;
    assert!(candidates.contains(&"modules/s3/main.tf".to_string()));
    assert!(candidates.contains(&"modules/s3/variables.tf".to_string()));
    assert!(candidates.contains(&"main.tf".to_string()));
    assert!(!candidates.contains(&"envs/prod.tfvars".to_string()));
}

#[test]
fn test_unknown_identifiers_fail_with_diagnostics() {
    let repo = TerraformRepo::empty();
    repo.write("main.tf", "locals { owner = \"platform\" }\n");
    let planner = RemediationPlanner::new(config())
        .with_classifier(Box::new(StaticClassifier::new(ResourceType::new("kms"))));

    let err = planner
        .plan(repo.path(), &intent(&["missing-key"]))
        .unwrap_err();

    match err {
        RemediationError::NoAffectedFilesMatched {
            resource_type,
            definition_files,
            manifest_files,
            ..
        } => {
            assert_eq!(resource_type, "kms");
            assert_eq!(definition_files, 1);
            assert_eq!(manifest_files, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_repository_without_definitions() {
    let repo = TerraformRepo::empty();
    repo.write("README.md", "# infra\n");

    let recorder = Arc::new(RecordingHandler::new());
    let err = RemediationPlanner::new(config())
        .with_progress(recorder.clone())
        .plan(repo.path(), &intent(&["logs-bucket"]))
        .unwrap_err();

    assert!(matches!(err, RemediationError::DiscoveryEmpty(_)));
    assert!(matches!(
        recorder.events().last(),
        Some(ProgressEvent::Failed { .. })
    ));
}

#[test]
fn test_missing_repository_path() {
    let repo = TerraformRepo::empty();
    let err = RemediationPlanner::new(config())
        .scan(&repo.join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, RemediationError::PathNotFound(_)));
}

#[test]
fn test_file_cap_limits_loaded_contents() {
    let repo = TerraformRepo::empty();
    for i in 0..5 {
        repo.write(
            &format!("bucket_{i}.tf"),
            &format!("resource \"aws_s3_bucket\" \"b{i}\" {{\n  bucket = \"logs-{i}\"\n}}\n"),
        );
    }
    let mut config = config();
    config.max_files = 3;

    let plan = RemediationPlanner::new(config)
        .with_classifier(Box::new(StaticClassifier::new(ResourceType::new("s3"))))
        .plan(repo.path(), &intent(&[]))
        .unwrap();

    assert_eq!(plan.selection.candidates.len(), 5);
    assert_eq!(plan.context.candidate_files.len(), 3);
    assert_eq!(plan.context.candidate_file_contents.len(), 3);
}

#[test]
fn test_context_serializes_to_json() {
    let repo = TerraformRepo::standard();
    let plan = RemediationPlanner::new(config())
        .plan(repo.path(), &intent(&["assets-bucket"]))
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&plan.context.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["intent"]["jira_id"], "SEC-42");
    assert_eq!(value["affected_resources"][0], "assets-bucket");
    assert_eq!(value["selection_tier"], "resource_name_match");
    assert!(value["candidate_file_contents"]["main.tf"].is_string());
}
