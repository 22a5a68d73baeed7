//! Proposed full-file replacements and their guarded application

mod apply;
mod payload;

pub use apply::{ChangeApplier, ChangeReview};
pub use payload::{safe_relative_path, strip_code_fence, ProposedChange};
