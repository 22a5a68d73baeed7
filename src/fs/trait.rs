//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
}

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string, replacing invalid UTF-8 sequences
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write file contents, replacing anything already there
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Recursively list every regular file under `root` in lexical path order.
    ///
    /// Directories whose name appears in `pruned_dirs` are not descended into.
    fn walk_files(&self, root: &Path, pruned_dirs: &[String]) -> Result<Vec<PathBuf>>;

    /// Canonicalize a path
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}
