//! Subcommand entry points. Each returns the process exit code.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

use super::commands::{
    ApplyArgs, ConfigArgs, PlanArgs, ScanArgs, SelectionOverrides, ValidateArgs,
};
use super::output::{OutputFormatter, ScanReport};
use crate::config::RemediatorConfig;
use crate::error::RemediationError;
use crate::format::TerraformFormatter;
use crate::intent::{RemediationIntent, ResourceType, StaticClassifier};
use crate::pipeline::RemediationPlanner;
use crate::progress::LoggingHandler;
use crate::validation::ChangeValidator;
use crate::vcs::GitDiffProbe;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// A proposed change was refused because it would drop critical content
pub const EXIT_REJECTED: i32 = 2;

pub fn handle_scan(args: &ScanArgs) -> i32 {
    finish(run_scan(args))
}

pub fn handle_plan(args: &PlanArgs) -> i32 {
    finish(run_plan(args))
}

pub fn handle_apply(args: &ApplyArgs) -> i32 {
    finish(run_apply(args))
}

pub fn handle_validate(args: &ValidateArgs) -> i32 {
    finish(run_validate(args))
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    finish(run_config(args))
}

/// Maps an error chain to an exit code
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RemediationError>() {
        Some(RemediationError::StructuralLossRejected { .. }) => EXIT_REJECTED,
        _ => EXIT_FAILURE,
    }
}

fn finish(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("Error: {:#}", err);
            exit_code_for(&err)
        }
    }
}

fn load_config(overrides: Option<&SelectionOverrides>) -> Result<RemediatorConfig> {
    let mut config = RemediatorConfig::default();
    if let Some(overrides) = overrides {
        if let Some(max_files) = overrides.max_files {
            config.max_files = max_files;
        }
        if let Some(max_context_chars) = overrides.max_context_chars {
            config.max_context_chars = max_context_chars;
        }
    }
    config.validate().context("Invalid configuration")?;
    debug!(config = ?config, "Loaded configuration");
    Ok(config)
}

/// Reads a file, or stdin when the path is `-`
fn read_input(path: &Path, what: &str) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| format!("Failed to read {} from stdin", what))?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {} from {}", what, path.display()))
}

fn read_intent(path: &Path) -> Result<RemediationIntent> {
    let raw = read_input(path, "intent")?;
    RemediationIntent::parse(&raw).context("Failed to parse intent")
}

fn emit(rendered: String, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            println!("{}", rendered.trim_end());
            Ok(())
        }
    }
}

fn planner(config: RemediatorConfig) -> RemediationPlanner {
    RemediationPlanner::new(config).with_progress(Arc::new(LoggingHandler))
}

fn run_scan(args: &ScanArgs) -> Result<i32> {
    let config = load_config(None)?;
    let scan = planner(config).scan(&args.repository_path)?;

    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_scan(&ScanReport::from_scan(&scan))?, None)?;
    Ok(EXIT_OK)
}

fn run_plan(args: &PlanArgs) -> Result<i32> {
    let config = load_config(Some(&args.overrides))?;
    let intent = read_intent(&args.intent)?;

    let mut planner = planner(config);
    if let Some(resource_type) = &args.resource_type {
        planner = planner.with_classifier(Box::new(StaticClassifier::new(ResourceType::new(
            resource_type,
        ))));
    }

    let plan = planner.plan(&args.repository_path, &intent)?;
    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_context(&plan.context)?, args.output.as_deref())?;
    Ok(EXIT_OK)
}

fn run_apply(args: &ApplyArgs) -> Result<i32> {
    if args.intent == Path::new("-") {
        anyhow::bail!("The intent must be read from a file; stdin is reserved for --payload");
    }
    let config = load_config(None)?;

    let mut intent = read_intent(&args.intent)?.normalize()?;
    if args.timestamp_branch {
        intent = intent.with_timestamped_branch(Utc::now());
    }
    let payload = read_input(&args.payload, "change payload")?;

    let mut planner = planner(config)
        .with_diff_probe(Box::new(GitDiffProbe::new().with_untracked(args.untracked)));
    if args.terraform_fmt {
        planner = planner.with_formatter(Box::new(TerraformFormatter::new()));
    }

    let outcome = planner.apply(&args.repository_path, &intent, &payload)?;
    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_apply(&outcome)?, None)?;
    Ok(EXIT_OK)
}

fn run_validate(args: &ValidateArgs) -> Result<i32> {
    let mut config = load_config(None)?;
    if let Some(ratio) = args.min_size_ratio {
        config.min_size_ratio = ratio;
        config.validate().context("Invalid --min-size-ratio")?;
    }

    let original = read_input(&args.original, "original file")?;
    let proposed = read_input(&args.proposed, "proposed file")?;
    let path = args.path.clone().unwrap_or_else(|| {
        args.original
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.original.display().to_string())
    });

    let verdict = ChangeValidator::new(config.validation_policy())
        .with_progress(Arc::new(LoggingHandler))
        .validate(&path, &original, &proposed);

    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_verdict(&verdict)?, None)?;
    Ok(if verdict.passed { EXIT_OK } else { EXIT_REJECTED })
}

fn run_config(args: &ConfigArgs) -> Result<i32> {
    let config = RemediatorConfig::default();
    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_config(&config)?, None)?;

    if let Err(err) = config.validate() {
        eprintln!("Warning: {}", err);
        return Ok(EXIT_FAILURE);
    }
    Ok(EXIT_OK)
}
