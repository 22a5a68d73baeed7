use super::context::{ApplyOutcome, GenerationContext, PullRequestDraft};
use crate::changes::{ChangeApplier, ProposedChange};
use crate::config::RemediatorConfig;
use crate::error::{RemediationError, Result};
use crate::format::{NoOpFormatter, SourceFormatter};
use crate::fs::{FileSystem, RealFileSystem};
use crate::intent::{classify_or_default, KeywordClassifier, RemediationIntent, ResourceClassifier, ResourceType};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::resolver::{ModuleResolution, ModuleResolver};
use crate::scanner::{FileInventory, RepositoryScanner, ScanConfig};
use crate::selection::{CandidateSelector, Selection, SelectionInput};
use crate::validation::ChangeValidator;
use crate::vcs::{DiffProbe, GitDiffProbe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Inventory plus module resolution of one checkout
#[derive(Debug, Clone)]
pub struct RepositoryScan {
    pub inventory: FileInventory,
    pub resolution: ModuleResolution,
}

/// Outcome of planning: the selection that was made and the context built from it
#[derive(Debug, Clone)]
pub struct RemediationPlan {
    pub scan: RepositoryScan,
    pub resource_type: ResourceType,
    pub selection: Selection,
    pub context: GenerationContext,
}

/// Sequences a remediation run: scan, resolve, select and load context, then
/// later validate, write, probe the diff and draft the pull request.
pub struct RemediationPlanner {
    fs: Arc<dyn FileSystem>,
    config: RemediatorConfig,
    scan_config: ScanConfig,
    classifier: Box<dyn ResourceClassifier>,
    diff_probe: Box<dyn DiffProbe>,
    formatter: Box<dyn SourceFormatter>,
    progress: Arc<dyn ProgressHandler>,
}

impl RemediationPlanner {
    pub fn new(config: RemediatorConfig) -> Self {
        Self {
            fs: Arc::new(RealFileSystem::new()),
            config,
            scan_config: ScanConfig::default(),
            classifier: Box::new(KeywordClassifier::new()),
            diff_probe: Box::new(GitDiffProbe::new()),
            formatter: Box::new(NoOpFormatter),
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_scan_config(mut self, scan_config: ScanConfig) -> Self {
        self.scan_config = scan_config;
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn ResourceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_diff_probe(mut self, diff_probe: Box<dyn DiffProbe>) -> Self {
        self.diff_probe = diff_probe;
        self
    }

    pub fn with_formatter(mut self, formatter: Box<dyn SourceFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &RemediatorConfig {
        &self.config
    }

    pub fn scan(&self, repo_path: &Path) -> Result<RepositoryScan> {
        self.reporting(|| self.scan_inner(repo_path))
    }

    /// Builds the generation context for `intent` against the checkout
    pub fn plan(&self, repo_path: &Path, intent: &RemediationIntent) -> Result<RemediationPlan> {
        self.reporting(|| self.plan_inner(repo_path, intent))
    }

    /// Parses `raw_payload`, validates and writes it, and drafts the pull
    /// request. Fails with `EmptyDiff` when the checkout ends up unchanged.
    pub fn apply(
        &self,
        repo_path: &Path,
        intent: &RemediationIntent,
        raw_payload: &str,
    ) -> Result<ApplyOutcome> {
        self.reporting(|| self.apply_inner(repo_path, intent, raw_payload))
    }

    fn scan_inner(&self, repo_path: &Path) -> Result<RepositoryScan> {
        let scanner = RepositoryScanner::with_fs(repo_path.to_path_buf(), self.fs.clone())?
            .with_config(self.scan_config.clone())
            .with_progress(self.progress.clone());
        let mut inventory = scanner.scan()?;

        let resolution = ModuleResolver::new(self.fs.clone())
            .with_progress(self.progress.clone())
            .resolve(&scanner, &mut inventory);

        Ok(RepositoryScan {
            inventory,
            resolution,
        })
    }

    fn plan_inner(&self, repo_path: &Path, intent: &RemediationIntent) -> Result<RemediationPlan> {
        let start = Instant::now();
        let supported = self.config.resource_type_set();
        let resource_type = classify_or_default(self.classifier.as_ref(), intent, &supported);
        let affected_resources = intent.affected_resources();
        info!(
            resource_type = %resource_type,
            affected = affected_resources.len(),
            "Planning remediation"
        );

        let scan = self.scan_inner(repo_path)?;

        let selector = CandidateSelector::new(self.fs.clone())
            .with_provider_prefix(self.config.provider_prefix.clone())
            .with_limits(self.config.selection_limits())
            .with_progress(self.progress.clone());
        let selection = selector.select(SelectionInput {
            inventory: &scan.inventory,
            resolution: &scan.resolution,
            affected_resources: &affected_resources,
            resource_type: &resource_type,
        })?;
        let loaded = selector.load_contents(&scan.inventory, &selection.candidates);

        let relative = |paths: &[PathBuf]| -> Vec<String> {
            paths.iter().map(|p| scan.inventory.relative(p)).collect()
        };
        let context = GenerationContext {
            intent: intent.clone(),
            resource_type: resource_type.clone(),
            selection_tier: selection.candidates.tier,
            affected_resources,
            matched_files: relative(&selection.matches.matched_files),
            related_files: relative(&selection.matches.related_files),
            module_source_dirs: relative(&scan.resolution.source_dirs),
            candidate_files: loaded.order,
            candidate_file_contents: loaded.contents,
            truncated: loaded.truncated,
        };

        info!(
            tier = %selection.candidates.tier,
            files = context.candidate_files.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generation context ready"
        );

        Ok(RemediationPlan {
            scan,
            resource_type,
            selection,
            context,
        })
    }

    fn apply_inner(
        &self,
        repo_path: &Path,
        intent: &RemediationIntent,
        raw_payload: &str,
    ) -> Result<ApplyOutcome> {
        let change = ProposedChange::parse(raw_payload)?;
        info!(files = change.len(), "Applying proposed change");

        let validator = ChangeValidator::new(self.config.validation_policy())
            .with_progress(self.progress.clone());
        let written = ChangeApplier::new(self.fs.clone(), validator)
            .with_progress(self.progress.clone())
            .apply(repo_path, &change)?;

        for path in written.iter().filter(|p| self.formatter.handles(p)) {
            if let Err(err) = self.formatter.format(repo_path, path) {
                warn!(path = %path, error = %err, "Formatting failed, keeping file as written");
            }
        }

        let changed_files = self.diff_probe.changed_paths(repo_path)?;
        if changed_files.is_empty() {
            return Err(RemediationError::EmptyDiff);
        }

        let draft = PullRequestDraft::new(intent, &changed_files);
        Ok(ApplyOutcome {
            written_files: written,
            changed_files,
            draft,
        })
    }

    fn reporting<T>(&self, run: impl FnOnce() -> Result<T>) -> Result<T> {
        run().map_err(|err| {
            self.progress.on_progress(&ProgressEvent::Failed {
                error: err.to_string(),
            });
            err
        })
    }
}
