#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const MAIN_TF: &str = r#"terraform {
  backend "s3" {
    bucket = "acme-tfstate"
    key    = "infra/terraform.tfstate"
  }
}

provider "aws" {
  region = var.region
}

module "storage" {
  source  = "${path.module}/modules/s3"
  buckets = ["logs-bucket", "assets-bucket"]
}

module "network" {
  source = "terraform-aws-modules/vpc/aws"
}
"#;

pub const S3_MODULE_TF: &str = r#"resource "aws_s3_bucket" "this" {
  for_each = toset(var.buckets)
  bucket   = each.value
}
"#;

pub const VARIABLES_TF: &str = r#"variable "region" {
  default = "eu-west-1"
}
"#;

/// A Terraform checkout laid out in a temporary directory
pub struct TerraformRepo {
    dir: TempDir,
}

impl TerraformRepo {
    /// Root module wired to a local S3 module and a registry VPC module
    pub fn standard() -> Self {
        let repo = Self::empty();
        repo.write("main.tf", MAIN_TF);
        repo.write("variables.tf", VARIABLES_TF);
        repo.write("modules/s3/main.tf", S3_MODULE_TF);
        repo.write("modules/s3/variables.tf", "variable \"buckets\" {}\n");
        repo.write("envs/prod.tfvars", "region = \"eu-west-1\"\n");
        repo.write(
            ".terraform/modules/network/main.tf",
            "resource \"aws_vpc\" \"cached\" {}\n",
        );
        repo
    }

    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write fixture file");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.join(relative)).expect("Failed to read fixture file")
    }

    /// Initializes git and commits everything currently in the tree
    pub fn commit_all(&self) {
        self.git(&["init", "-q"]);
        self.git(&["config", "user.name", "test-user"]);
        self.git(&["config", "user.email", "test@example.com"]);
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", "initial"]);
    }

    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

pub fn intent_json(affected: &[&str]) -> String {
    serde_json::json!({
        "jira_id": "SEC-42",
        "repo": "https://github.com/acme/infra.git",
        "summary": "Enable default encryption on S3 buckets",
        "affected_resources": affected,
    })
    .to_string()
}
