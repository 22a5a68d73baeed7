//! Ranking and selecting the files a remediation should touch

mod budget;
mod selector;
mod strategy;

pub use budget::{ContextBudget, LoadedContents, SelectionLimits};
pub use selector::{CandidateSelector, Selection, SelectionInput};
pub use strategy::{CandidateSet, MatchSets, SelectionTier};
