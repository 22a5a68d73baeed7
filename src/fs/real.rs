use super::FileSystem;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).context(format!("Failed to read file {:?}", path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).context(format!("Failed to write file {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }

    fn walk_files(&self, root: &Path, pruned_dirs: &[String]) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {:?}", root);
        }

        let pruned = pruned_dirs.to_vec();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !pruned.iter().any(|p| p == name))
                    .unwrap_or(true)
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .context(format!("Failed to canonicalize path {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::create_dir(base.join("modules")).unwrap();
        fs::create_dir(base.join(".terraform")).unwrap();
        fs::File::create(base.join("main.tf"))
            .unwrap()
            .write_all(b"module \"s3\" {}")
            .unwrap();
        fs::File::create(base.join("modules/bucket.tf"))
            .unwrap()
            .write_all(b"resource \"aws_s3_bucket\" \"b\" {}")
            .unwrap();
        fs::File::create(base.join(".terraform/cached.tf"))
            .unwrap()
            .write_all(b"# cached")
            .unwrap();

        dir
    }

    #[test]
    fn test_exists_and_kinds() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.exists(temp.path()));
        assert!(fs.is_dir(&temp.path().join("modules")));
        assert!(fs.is_file(&temp.path().join("main.tf")));
        assert!(!fs.exists(&temp.path().join("nonexistent")));
    }

    #[test]
    fn test_read_to_string_lossy() {
        let temp = create_test_dir();
        let path = temp.path().join("binary.tf");
        fs::write(&path, [b'o', b'k', 0xff]).unwrap();

        let fs = RealFileSystem::new();
        let content = fs.read_to_string(&path).unwrap();
        assert!(content.starts_with("ok"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_write_and_create_dir_all() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let dir = temp.path().join("new/nested");
        fs.create_dir_all(&dir).unwrap();
        fs.write(&dir.join("x.tf"), "locals {}").unwrap();

        assert_eq!(fs.read_to_string(&dir.join("x.tf")).unwrap(), "locals {}");
    }

    #[test]
    fn test_walk_files_sorted_and_pruned() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let files = fs
            .walk_files(temp.path(), &[".terraform".to_string()])
            .unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(rel, vec!["main.tf".to_string(), "modules/bucket.tf".to_string()]);
    }

    #[test]
    fn test_walk_files_includes_gitignored() {
        let temp = create_test_dir();
        fs::write(temp.path().join(".gitignore"), "*.tf\n").unwrap();
        let fs = RealFileSystem::new();

        let files = fs.walk_files(temp.path(), &[]).unwrap();
        assert!(files.iter().any(|p| p.ends_with("main.tf")));
        assert!(files.iter().any(|p| p.ends_with(".terraform/cached.tf")));
    }

    #[test]
    fn test_walk_files_rejects_file_root() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();
        assert!(fs.walk_files(&temp.path().join("main.tf"), &[]).is_err());
    }

    #[test]
    fn test_canonicalize() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let canonical = fs.canonicalize(temp.path()).unwrap();
        assert!(canonical.is_absolute());
    }
}
