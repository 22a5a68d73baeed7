//! Progress handler trait and events

use crate::selection::SelectionTier;
use std::sync::Mutex;
use std::time::Duration;

/// Events emitted while a remediation run progresses
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Repository walk started
    ScanStarted { repo_path: String },

    /// Repository walk completed
    ScanComplete {
        definition_files: usize,
        manifest_files: usize,
        scan_time: Duration,
    },

    /// Module declarations in root files were resolved
    ModulesResolved {
        declared: usize,
        resolved_dirs: usize,
        module_files: usize,
    },

    /// A selection tier produced the candidate set
    CandidatesSelected {
        tier: SelectionTier,
        candidates: usize,
    },

    /// Candidate contents were loaded under the context budget
    ContextBudgetApplied {
        files_included: usize,
        total_chars: usize,
        truncated: bool,
    },

    /// A sensitive file's proposed replacement was checked
    ValidationComplete {
        path: String,
        passed: bool,
        reasons: Vec<String>,
    },

    /// Accepted files were written to the checkout
    ChangesApplied { files_written: usize },

    /// The run stopped with an error
    Failed { error: String },
}

/// Trait for handling progress events during a remediation run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Handler that keeps every event, for inspection after a run
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
