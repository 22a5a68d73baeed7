use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Path-templating tokens that all mean "relative to here" for a root module
const DIRECTORY_TOKENS: &[&str] = &["${path.module}", "${path.root}", "${path.cwd}"];

/// Local source prefixes; anything else (registry, git, http, s3) is remote
const LOCAL_PREFIXES: &[&str] = &["./", "../", "modules/"];

/// A `module "<name>" { source = "..." }` declaration found in a root file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReference {
    /// Root file the declaration was found in
    pub declared_in: PathBuf,
    pub name: String,
    pub raw_source: String,
    pub normalized_source: String,
    /// Existing directory inside the repository, when the source is local
    pub resolved_dir: Option<PathBuf>,
}

/// Replaces directory tokens with `.` and trims whitespace. Idempotent.
pub fn normalize_source(raw: &str) -> String {
    let mut normalized = raw.to_string();
    for token in DIRECTORY_TOKENS {
        normalized = normalized.replace(token, ".");
    }
    normalized.trim().to_string()
}

pub fn is_resolvable(normalized: &str) -> bool {
    LOCAL_PREFIXES.iter().any(|p| normalized.starts_with(p))
}

/// Collapses `.` and `..` components without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
