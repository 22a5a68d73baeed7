use super::payload::{safe_relative_path, ProposedChange};
use crate::error::{RemediationError, Result};
use crate::fs::FileSystem;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::validation::{ChangeValidator, ValidationVerdict};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Review of a proposed change before anything touches disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReview {
    /// Normalized relative path and content, in write order
    pub accepted: Vec<(String, String)>,
    /// One verdict per sensitive file that already exists
    pub verdicts: Vec<ValidationVerdict>,
}

impl ChangeReview {
    /// Every failed verdict, in payload order
    pub fn rejections(&self) -> Vec<ValidationVerdict> {
        self.verdicts
            .iter()
            .filter(|v| v.is_rejected())
            .cloned()
            .collect()
    }
}

/// Writes proposed replacements into a checkout.
///
/// Every path is checked and every sensitive file validated before the first
/// write; one rejection aborts the whole batch.
pub struct ChangeApplier {
    fs: Arc<dyn FileSystem>,
    validator: ChangeValidator,
    progress: Arc<dyn ProgressHandler>,
}

impl ChangeApplier {
    pub fn new(fs: Arc<dyn FileSystem>, validator: ChangeValidator) -> Self {
        Self {
            fs,
            validator,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Checks paths and validates sensitive files without writing
    pub fn review(&self, root: &Path, change: &ProposedChange) -> Result<ChangeReview> {
        let mut review = ChangeReview::default();

        for (raw_path, content) in &change.files {
            let relative = safe_relative_path(raw_path)?;
            let target = root.join(&relative);

            if self.validator.policy().is_sensitive(&relative) && self.fs.is_file(&target) {
                let original = self
                    .fs
                    .read_to_string(&target)
                    .map_err(|e| RemediationError::file_access(&target, e))?;
                review
                    .verdicts
                    .push(self.validator.validate(&relative, &original, content));
            }

            review.accepted.push((relative, content.clone()));
        }

        Ok(review)
    }

    /// Validates, then writes every file. Returns the written relative paths.
    pub fn apply(&self, root: &Path, change: &ProposedChange) -> Result<Vec<String>> {
        let review = self.review(root, change)?;
        let rejections = review.rejections();
        if !rejections.is_empty() {
            return Err(RemediationError::StructuralLossRejected { rejections });
        }

        let mut written = Vec::with_capacity(review.accepted.len());
        for (relative, content) in review.accepted {
            let target = root.join(&relative);
            self.write(&target, &content)?;
            debug!(path = %relative, chars = content.chars().count(), "Wrote file");
            written.push(relative);
        }

        info!(files = written.len(), "Applied proposed changes");
        self.progress.on_progress(&ProgressEvent::ChangesApplied {
            files_written: written.len(),
        });
        Ok(written)
    }

    fn write(&self, target: &Path, content: &str) -> Result<()> {
        if let Some(parent) = target.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| RemediationError::file_access(parent, e))?;
        }
        self.fs
            .write(target, content)
            .map_err(|e| RemediationError::file_access(target, e))
    }
}
