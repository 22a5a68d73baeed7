use super::reference::{is_resolvable, normalize_lexically, normalize_source, ModuleReference};
use crate::fs::FileSystem;
use crate::hcl;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::scanner::{FileInventory, RepositoryScanner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Module declarations of the root files and the local directories they point at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleResolution {
    pub references: Vec<ModuleReference>,
    /// Existing module directories, deduplicated in first-seen order
    pub source_dirs: Vec<PathBuf>,
}

impl ModuleResolution {
    /// Raw `source` values as declared, for diagnostics
    pub fn declared_sources(&self) -> Vec<String> {
        self.references.iter().map(|r| r.raw_source.clone()).collect()
    }
}

pub struct ModuleResolver {
    fs: Arc<dyn FileSystem>,
    progress: Arc<dyn ProgressHandler>,
}

impl ModuleResolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Extracts every top-level `module` block with a literal `source` from
    /// `content` and resolves local sources against `root`.
    pub fn extract_references(
        &self,
        root: &Path,
        declared_in: &Path,
        content: &str,
    ) -> Vec<ModuleReference> {
        hcl::parse_blocks(content)
            .into_iter()
            .filter(|block| block.kind == "module")
            .filter_map(|block| {
                let raw_source = block.attribute("source")?.string_value?;
                let normalized_source = normalize_source(&raw_source);
                let resolved_dir = self.resolve_dir(root, &normalized_source);

                Some(ModuleReference {
                    declared_in: declared_in.to_path_buf(),
                    name: block.label(0).unwrap_or_default().to_string(),
                    raw_source,
                    normalized_source,
                    resolved_dir,
                })
            })
            .collect()
    }

    /// Resolves the module declarations of every root-level definition file
    /// and records the definition files under resolved directories in
    /// `inventory.module_files`.
    ///
    /// Directories inside the checkout reuse the scan; sibling directories
    /// reached through `../` are walked with `scanner`.
    pub fn resolve(
        &self,
        scanner: &RepositoryScanner,
        inventory: &mut FileInventory,
    ) -> ModuleResolution {
        let mut resolution = ModuleResolution::default();

        for path in inventory.root_definition_files() {
            let content = match self.fs.read_to_string(&path) {
                Ok(c) => c,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable root file");
                    continue;
                }
            };

            for reference in self.extract_references(&inventory.root, &path, &content) {
                debug!(
                    module = %reference.name,
                    source = %reference.raw_source,
                    resolved = reference.resolved_dir.is_some(),
                    "Found module declaration"
                );
                if let Some(dir) = &reference.resolved_dir {
                    if !resolution.source_dirs.contains(dir) {
                        resolution.source_dirs.push(dir.clone());
                    }
                }
                resolution.references.push(reference);
            }
        }

        let mut module_files: Vec<PathBuf> = Vec::new();
        for dir in &resolution.source_dirs {
            let files = if dir.starts_with(&inventory.root) {
                inventory.definition_files_under(dir)
            } else {
                match scanner.definition_files_under(dir) {
                    Ok(files) => files,
                    Err(err) => {
                        warn!(
                            dir = %dir.display(),
                            error = %err,
                            "Skipping unreadable module directory"
                        );
                        continue;
                    }
                }
            };
            for file in files {
                if !module_files.contains(&file) {
                    module_files.push(file);
                }
            }
        }
        inventory.module_files = module_files;

        info!(
            declared = resolution.references.len(),
            resolved_dirs = resolution.source_dirs.len(),
            module_files = inventory.module_files.len(),
            "Module resolution completed"
        );
        self.progress.on_progress(&ProgressEvent::ModulesResolved {
            declared: resolution.references.len(),
            resolved_dirs: resolution.source_dirs.len(),
            module_files: inventory.module_files.len(),
        });

        resolution
    }

    fn resolve_dir(&self, root: &Path, normalized: &str) -> Option<PathBuf> {
        if !is_resolvable(normalized) {
            debug!(source = normalized, "Module source is not local, skipping");
            return None;
        }

        let dir = normalize_lexically(&root.join(normalized));
        if !self.fs.is_dir(&dir) {
            debug!(dir = %dir.display(), "Module directory does not exist, skipping");
            return None;
        }
        Some(dir)
    }
}
