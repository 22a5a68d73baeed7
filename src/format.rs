//! Best-effort canonical formatting of written definition files.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub trait SourceFormatter: Send + Sync {
    /// Rewrites `relative` (inside `repo_dir`) in canonical style
    fn format(&self, repo_dir: &Path, relative: &str) -> Result<()>;

    /// Whether this formatter handles the given path
    fn handles(&self, relative: &str) -> bool;
}

/// Leaves files as written
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpFormatter;

impl SourceFormatter for NoOpFormatter {
    fn format(&self, _repo_dir: &Path, _relative: &str) -> Result<()> {
        Ok(())
    }

    fn handles(&self, _relative: &str) -> bool {
        false
    }
}

/// Runs `terraform fmt -check <file>` on `.tf` files and rewrites the file
/// with `terraform fmt <file>` only when the check fails.
///
/// Each invocation is killed once it outlives the timeout.
#[derive(Debug, Clone)]
pub struct TerraformFormatter {
    binary: String,
    timeout: Duration,
}

impl TerraformFormatter {
    pub fn new() -> Self {
        Self::with_binary("terraform")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, repo_dir: &Path, args: &[&str]) -> Result<(ExitStatus, String)> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .current_dir(repo_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run {}", self.binary))?;

        let started = Instant::now();
        let status = loop {
            let polled = child
                .try_wait()
                .with_context(|| format!("Failed to wait for {}", self.binary))?;
            match polled {
                Some(status) => break status,
                None if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    bail!(
                        "{} {} timed out after {}ms",
                        self.binary,
                        args.join(" "),
                        self.timeout.as_millis()
                    );
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        Ok((status, stderr.trim().to_string()))
    }
}

impl Default for TerraformFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFormatter for TerraformFormatter {
    fn format(&self, repo_dir: &Path, relative: &str) -> Result<()> {
        let (status, stderr) = self.run(repo_dir, &["fmt", "-check", relative])?;
        if status.success() {
            debug!(path = relative, "File already formatted");
            return Ok(());
        }
        warn!(path = relative, stderr = %stderr, "Format check failed, rewriting");

        let (status, stderr) = self.run(repo_dir, &["fmt", relative])?;
        if !status.success() {
            bail!("{} fmt {} failed: {}", self.binary, relative, stderr);
        }
        debug!(path = relative, "Formatted file");
        Ok(())
    }

    fn handles(&self, relative: &str) -> bool {
        relative.ends_with(".tf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_only_tf_files() {
        let formatter = TerraformFormatter::new();
        assert!(formatter.handles("modules/s3/main.tf"));
        assert!(!formatter.handles("prod.tfvars"));
        assert!(!formatter.handles("terragrunt.hcl"));
        assert!(!NoOpFormatter.handles("main.tf"));
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = TerraformFormatter::with_binary("definitely-not-a-terraform-binary");
        let err = formatter.format(dir.path(), "main.tf").unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
    }

    #[cfg(unix)]
    mod fake_binary {
        use super::*;
        use serial_test::serial;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        /// Writes an executable shell script that logs its arguments to
        /// `calls.log` next to itself
        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("terraform");
            let log = dir.path().join("calls.log");
            fs::write(
                &path,
                format!("#!/bin/sh\necho \"$*\" >> '{}'\n{}\n", log.display(), body),
            )
            .unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn calls(dir: &TempDir) -> Vec<String> {
            fs::read_to_string(dir.path().join("calls.log"))
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }

        #[test]
        #[serial]
        fn test_formatted_file_is_only_checked() {
            let bin = tempfile::tempdir().unwrap();
            let repo = tempfile::tempdir().unwrap();
            let binary = script(&bin, "exit 0");

            TerraformFormatter::with_binary(binary.display().to_string())
                .format(repo.path(), "main.tf")
                .unwrap();

            assert_eq!(calls(&bin), vec!["fmt -check main.tf"]);
        }

        #[test]
        #[serial]
        fn test_failed_check_triggers_rewrite() {
            let bin = tempfile::tempdir().unwrap();
            let repo = tempfile::tempdir().unwrap();
            let binary = script(&bin, "[ \"$2\" = \"-check\" ] && exit 3\nexit 0");

            TerraformFormatter::with_binary(binary.display().to_string())
                .format(repo.path(), "main.tf")
                .unwrap();

            assert_eq!(calls(&bin), vec!["fmt -check main.tf", "fmt main.tf"]);
        }

        #[test]
        #[serial]
        fn test_hung_formatter_is_killed() {
            let bin = tempfile::tempdir().unwrap();
            let repo = tempfile::tempdir().unwrap();
            let binary = script(&bin, "exec sleep 30");

            let started = Instant::now();
            let err = TerraformFormatter::with_binary(binary.display().to_string())
                .with_timeout(Duration::from_millis(200))
                .format(repo.path(), "main.tf")
                .unwrap_err();

            assert!(err.to_string().contains("timed out after 200ms"), "{err}");
            assert!(started.elapsed() < Duration::from_secs(10));
            assert_eq!(calls(&bin), vec!["fmt -check main.tf"]);
        }
    }
}
