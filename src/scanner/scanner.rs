use super::{FileInventory, FileKind};
use crate::error::{RemediationError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Filename suffixes of infrastructure definition files
    pub definition_extensions: Vec<String>,
    /// Exact filename of the canonical module manifest
    pub manifest_filename: String,
    /// Filename suffix of module manifests
    pub manifest_extension: String,
    /// Directory names never descended into
    pub pruned_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            definition_extensions: vec![".tf".to_string(), ".tfvars".to_string()],
            manifest_filename: "terragrunt.hcl".to_string(),
            manifest_extension: ".hcl".to_string(),
            pruned_dirs: vec![".git".to_string(), ".terraform".to_string()],
        }
    }
}

impl ScanConfig {
    pub fn classify(&self, filename: &str) -> Option<FileKind> {
        if self
            .definition_extensions
            .iter()
            .any(|ext| filename.ends_with(ext.as_str()))
        {
            Some(FileKind::Definition)
        } else if filename == self.manifest_filename
            || filename.ends_with(self.manifest_extension.as_str())
        {
            Some(FileKind::Manifest)
        } else {
            None
        }
    }
}

pub struct RepositoryScanner {
    repo_path: PathBuf,
    fs: Arc<dyn FileSystem>,
    config: ScanConfig,
    progress: Arc<dyn ProgressHandler>,
}

impl RepositoryScanner {
    pub fn new(repo_path: PathBuf) -> Result<Self> {
        Self::with_fs(repo_path, Arc::new(RealFileSystem::new()))
    }

    pub fn with_fs(repo_path: PathBuf, fs: Arc<dyn FileSystem>) -> Result<Self> {
        if !fs.exists(&repo_path) {
            return Err(RemediationError::PathNotFound(repo_path));
        }
        if !fs.is_dir(&repo_path) {
            return Err(RemediationError::NotADirectory(repo_path));
        }

        let repo_path = fs
            .canonicalize(&repo_path)
            .map_err(|e| RemediationError::file_access(&repo_path, e))?;

        debug!(
            repo_path = %repo_path.display(),
            "RepositoryScanner initialized"
        );

        Ok(Self {
            repo_path,
            fs,
            config: ScanConfig::default(),
            progress: Arc::new(NoOpHandler),
        })
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Walks the whole checkout and classifies every regular file.
    ///
    /// Fails with `DiscoveryEmpty` when neither definition nor manifest files
    /// exist.
    pub fn scan(&self) -> Result<FileInventory> {
        let start = Instant::now();
        self.progress.on_progress(&ProgressEvent::ScanStarted {
            repo_path: self.repo_path.display().to_string(),
        });

        let mut inventory = FileInventory::new(self.repo_path.clone());
        for path in self.walk(&self.repo_path)? {
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.config.classify(filename) {
                Some(FileKind::Definition) => inventory.definition_files.push(path),
                Some(FileKind::Manifest) => inventory.manifest_files.push(path),
                None => {}
            }
        }

        let scan_time = start.elapsed();
        info!(
            definition_files = inventory.definition_files.len(),
            manifest_files = inventory.manifest_files.len(),
            scan_time_ms = scan_time.as_millis() as u64,
            "Repository scan completed"
        );
        self.progress.on_progress(&ProgressEvent::ScanComplete {
            definition_files: inventory.definition_files.len(),
            manifest_files: inventory.manifest_files.len(),
            scan_time,
        });

        if inventory.is_empty() {
            return Err(RemediationError::DiscoveryEmpty(self.repo_path.clone()));
        }

        Ok(inventory)
    }

    /// Definition files anywhere under `dir`, in lexical order
    pub fn definition_files_under(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .walk(dir)?
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| self.config.classify(n))
                    == Some(FileKind::Definition)
            })
            .collect())
    }

    fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.fs
            .walk_files(dir, &self.config.pruned_dirs)
            .map_err(|e| RemediationError::file_access(dir, e))
    }
}
