//! remediator - safe, scoped remediation of Terraform repositories
//!
//! Given a remediation intent and a checked-out infrastructure repository, this
//! crate works out which definition files the intent is about, builds the
//! bounded context a change generator needs, and applies the generated
//! full-file replacements only after confirming that no critical configuration
//! (modules, backend, providers, variables, outputs, resources) would be lost.
//!
//! # Core Concepts
//!
//! - **Inventory**: definition (`*.tf`, `*.tfvars`) and manifest (`*.hcl`) files
//!   found by [`scanner::RepositoryScanner`]
//! - **Module resolution**: local `module { source = ... }` declarations in root
//!   files followed to their directories by [`resolver::ModuleResolver`]
//! - **Candidate selection**: four ranked tiers, from files naming an affected
//!   resource down to every definition file, then a file and character budget
//! - **Change safety**: [`validation::ChangeValidator`] rules applied to every
//!   sensitive root file before [`changes::ChangeApplier`] writes anything
//!
//! # Example Usage
//!
//! ```no_run
//! use remediator::{RemediationIntent, RemediationPlanner, RemediatorConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let intent = RemediationIntent::parse(
//!     r#"{"jira_id": "SEC-42", "repo": "acme/infra", "affected_resources": ["logs-bucket"]}"#,
//! )?;
//! let planner = RemediationPlanner::new(RemediatorConfig::default());
//!
//! let plan = planner.plan(Path::new("./infra"), &intent)?;
//! println!("{}", plan.context.to_json_pretty()?);
//!
//! let payload = r#"{"files": {"s3.tf": "resource \"aws_s3_bucket\" \"logs\" {}\n"}}"#;
//! let outcome = planner.apply(Path::new("./infra"), &intent.normalize()?, payload)?;
//! println!("{}", outcome.draft.body);
//! # Ok(())
//! # }
//! ```

pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod fs;
pub mod hcl;
pub mod intent;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod scanner;
pub mod selection;
pub mod util;
pub mod validation;
pub mod vcs;

pub use changes::{ChangeApplier, ProposedChange};
pub use config::{ConfigError, RemediatorConfig};
pub use error::{RemediationError, Result};
pub use intent::{RemediationIntent, ResourceType};
pub use pipeline::{ApplyOutcome, GenerationContext, PullRequestDraft, RemediationPlanner};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::{ChangeValidator, ValidationVerdict};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
