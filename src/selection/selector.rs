use super::budget::{ContextBudget, LoadedContents, SelectionLimits};
use super::strategy::{CandidateSet, MatchSets, SelectionTier};
use crate::error::{RemediationError, Result};
use crate::fs::FileSystem;
use crate::intent::ResourceType;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::resolver::ModuleResolution;
use crate::scanner::FileInventory;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_PROVIDER_PREFIX: &str = "aws_";

/// Everything the selector needs from earlier stages of a run
#[derive(Debug, Clone, Copy)]
pub struct SelectionInput<'a> {
    pub inventory: &'a FileInventory,
    pub resolution: &'a ModuleResolution,
    pub affected_resources: &'a [String],
    pub resource_type: &'a ResourceType,
}

impl SelectionInput<'_> {
    fn has_identifiers(&self) -> bool {
        self.affected_resources.iter().any(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub matches: MatchSets,
    pub candidates: CandidateSet,
}

pub struct CandidateSelector {
    fs: Arc<dyn FileSystem>,
    provider_prefix: String,
    limits: SelectionLimits,
    progress: Arc<dyn ProgressHandler>,
}

impl CandidateSelector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            provider_prefix: DEFAULT_PROVIDER_PREFIX.to_string(),
            limits: SelectionLimits::default(),
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_provider_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.provider_prefix = prefix.into();
        self
    }

    pub fn with_limits(mut self, limits: SelectionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn limits(&self) -> SelectionLimits {
        self.limits
    }

    /// Computes the match sets and picks the first tier with a non-empty
    /// candidate set.
    pub fn select(&self, input: SelectionInput<'_>) -> Result<Selection> {
        let matches = self.match_sets(&input);
        let has_identifiers = input.has_identifiers();

        debug!(
            matched = matches.matched_files.len(),
            related = matches.related_files.len(),
            module = matches.module_files.len(),
            "Computed match sets"
        );

        if has_identifiers
            && matches.matched_files.is_empty()
            && matches.related_files.is_empty()
            && matches.module_files.is_empty()
        {
            return Err(RemediationError::NoAffectedFilesMatched {
                resource_type: input.resource_type.to_string(),
                definition_files: input.inventory.definition_files.len(),
                manifest_files: input.inventory.manifest_files.len(),
                module_sources: input.resolution.declared_sources(),
            });
        }

        let chosen = SelectionTier::ORDER.iter().find_map(|tier| {
            tier.select(&matches, input.inventory, has_identifiers)
                .map(|files| CandidateSet { tier: *tier, files })
        });

        let Some(candidates) = chosen else {
            return Err(RemediationError::NoCandidateFiles {
                resource_type: input.resource_type.to_string(),
                definition_files: input.inventory.definition_files.len(),
                related_files: matches.related_files.len(),
                module_files: matches.module_files.len(),
            });
        };

        info!(
            tier = %candidates.tier,
            candidates = candidates.len(),
            "Candidate files selected"
        );
        self.progress.on_progress(&ProgressEvent::CandidatesSelected {
            tier: candidates.tier,
            candidates: candidates.len(),
        });

        Ok(Selection {
            matches,
            candidates,
        })
    }

    /// Reads candidate contents in order, honoring the file cap and the
    /// character budget. Unreadable files are skipped.
    pub fn load_contents(&self, inventory: &FileInventory, candidates: &CandidateSet) -> LoadedContents {
        let mut budget = ContextBudget::new(self.limits.max_total_chars);

        for path in candidates.files.iter().take(self.limits.max_files) {
            if budget.is_exhausted() {
                break;
            }
            let content = match self.fs.read_to_string(path) {
                Ok(c) => c,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable candidate");
                    continue;
                }
            };
            budget.admit(inventory.relative(path), &content);
        }

        let loaded = budget.finish();
        if candidates.len() > self.limits.max_files {
            debug!(
                dropped = candidates.len() - self.limits.max_files,
                "Candidate list exceeded the file cap"
            );
        }
        info!(
            files = loaded.order.len(),
            total_chars = loaded.total_chars,
            truncated = loaded.truncated,
            "Context budget applied"
        );
        self.progress.on_progress(&ProgressEvent::ContextBudgetApplied {
            files_included: loaded.order.len(),
            total_chars: loaded.total_chars,
            truncated: loaded.truncated,
        });

        loaded
    }

    /// Reads every definition and manifest file once and sorts it into the
    /// matched and related sets.
    pub fn match_sets(&self, input: &SelectionInput<'_>) -> MatchSets {
        let identifiers: Vec<&str> = input
            .affected_resources
            .iter()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .collect();
        let type_marker = input.resource_type.as_str().to_lowercase();
        let prefixed_marker = format!("{}{}", self.provider_prefix.to_lowercase(), type_marker);

        let mut matches = MatchSets::default();

        for path in &input.inventory.definition_files {
            let Some(content) = self.read(path) else {
                continue;
            };
            if identifiers.iter().any(|id| content.contains(id)) {
                matches.matched_files.push(path.clone());
            }
            if mentions_type(&content, &type_marker, &prefixed_marker) {
                matches.related_files.push(path.clone());
            }
        }

        for path in &input.inventory.manifest_files {
            let Some(content) = self.read(path) else {
                continue;
            };
            if mentions_type(&content, &type_marker, &prefixed_marker) {
                matches.related_files.push(path.clone());
            }
        }

        matches.module_files = self.module_fallback(input);
        matches
    }

    /// The resolved module files, narrowed to `modules/<type>/` when that
    /// leaves any. Without resolved module files, the root `modules/<type>/`
    /// directory, else the whole root `modules/` tree.
    fn module_fallback(&self, input: &SelectionInput<'_>) -> Vec<PathBuf> {
        let inventory = input.inventory;
        let modules_root = inventory.root.join("modules");
        let type_dir = modules_root.join(input.resource_type.as_str());

        if !inventory.module_files.is_empty() {
            let narrowed: Vec<PathBuf> = inventory
                .module_files
                .iter()
                .filter(|p| p.starts_with(&type_dir))
                .cloned()
                .collect();
            if narrowed.is_empty() {
                return inventory.module_files.clone();
            }
            debug!(dir = %type_dir.display(), files = narrowed.len(), "Narrowed module files to resource type");
            return narrowed;
        }

        if self.fs.is_dir(&type_dir) {
            let files = inventory.definition_files_under(&type_dir);
            debug!(dir = %type_dir.display(), files = files.len(), "Using type-specific module directory");
            return files;
        }

        if self.fs.is_dir(&modules_root) {
            return inventory.definition_files_under(&modules_root);
        }

        Vec::new()
    }

    fn read(&self, path: &Path) -> Option<String> {
        match self.fs.read_to_string(path) {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping unreadable file");
                None
            }
        }
    }
}

fn mentions_type(content: &str, type_marker: &str, prefixed_marker: &str) -> bool {
    if type_marker.is_empty() {
        return false;
    }
    let lowered = content.to_lowercase();
    lowered.contains(type_marker) || lowered.contains(prefixed_marker)
}
