//! End-to-end sequencing of a remediation run

mod context;
mod planner;

pub use context::{ApplyOutcome, GenerationContext, PullRequestDraft};
pub use planner::{RemediationPlan, RemediationPlanner, RepositoryScan};
