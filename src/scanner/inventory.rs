use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// How the scanner classified a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Infrastructure definition file (`*.tf`, `*.tfvars`)
    Definition,
    /// Module manifest (`terragrunt.hcl`, `*.hcl`)
    Manifest,
}

/// Files discovered in one repository checkout.
///
/// Paths are absolute and kept in lexical order. `module_files` starts empty
/// and is filled in by the module resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileInventory {
    pub root: PathBuf,
    pub definition_files: Vec<PathBuf>,
    pub manifest_files: Vec<PathBuf>,
    pub module_files: Vec<PathBuf>,
}

impl FileInventory {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.definition_files.is_empty() && self.manifest_files.is_empty()
    }

    /// Definition files located directly in the repository root
    pub fn root_definition_files(&self) -> Vec<PathBuf> {
        self.definition_files
            .iter()
            .filter(|p| p.parent() == Some(self.root.as_path()))
            .cloned()
            .collect()
    }

    /// Definition files anywhere under `dir`
    pub fn definition_files_under(&self, dir: &Path) -> Vec<PathBuf> {
        self.definition_files
            .iter()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect()
    }

    /// Repository-relative path with `/` separators. Paths outside the
    /// checkout (sibling module directories) climb out with `..`.
    pub fn relative(&self, path: &Path) -> String {
        relative_to(&self.root, path)
    }
}

pub(crate) fn relative_to(root: &Path, path: &Path) -> String {
    if !path.is_absolute() || !root.is_absolute() {
        return join_components(path.strip_prefix(root).unwrap_or(path).components());
    }

    let root_parts: Vec<Component<'_>> = root.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let shared = root_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); root_parts.len() - shared];
    parts.extend(
        path_parts[shared..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

fn join_components<'a>(components: impl Iterator<Item = Component<'a>>) -> String {
    components
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
