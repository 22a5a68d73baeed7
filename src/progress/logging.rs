//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::ScanStarted { repo_path } => {
                info!(repo = %repo_path, "Scanning repository");
            }
            ProgressEvent::ScanComplete {
                definition_files,
                manifest_files,
                scan_time,
            } => {
                info!(
                    definition_files,
                    manifest_files,
                    scan_time_ms = scan_time.as_millis() as u64,
                    "Repository scan complete"
                );
            }
            ProgressEvent::ModulesResolved {
                declared,
                resolved_dirs,
                module_files,
            } => {
                info!(declared, resolved_dirs, module_files, "Module sources resolved");
            }
            ProgressEvent::CandidatesSelected { tier, candidates } => {
                info!(tier = %tier, candidates, "Candidate files selected");
            }
            ProgressEvent::ContextBudgetApplied {
                files_included,
                total_chars,
                truncated,
            } => {
                if *truncated {
                    warn!(
                        files_included,
                        total_chars, "Candidate contents truncated to fit context budget"
                    );
                } else {
                    debug!(files_included, total_chars, "Candidate contents loaded");
                }
            }
            ProgressEvent::ValidationComplete {
                path,
                passed,
                reasons,
            } => {
                if *passed {
                    debug!(path = %path, "Structural checks passed");
                } else {
                    error!(path = %path, reasons = %reasons.join(", "), "Structural checks failed");
                }
            }
            ProgressEvent::ChangesApplied { files_written } => {
                info!(files_written, "Changes written to checkout");
            }
            ProgressEvent::Failed { error } => {
                error!(error = %error, "Remediation run failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionTier;
    use std::time::Duration;

    #[test]
    fn test_logging_handler_accepts_every_event() {
        let handler = LoggingHandler;
        let events = vec![
            ProgressEvent::ScanStarted {
                repo_path: "/repo".to_string(),
            },
            ProgressEvent::ScanComplete {
                definition_files: 1,
                manifest_files: 0,
                scan_time: Duration::from_millis(1),
            },
            ProgressEvent::ModulesResolved {
                declared: 2,
                resolved_dirs: 1,
                module_files: 4,
            },
            ProgressEvent::CandidatesSelected {
                tier: SelectionTier::AllDefinitions,
                candidates: 1,
            },
            ProgressEvent::ContextBudgetApplied {
                files_included: 1,
                total_chars: 10,
                truncated: true,
            },
            ProgressEvent::ValidationComplete {
                path: "main.tf".to_string(),
                passed: false,
                reasons: vec!["Removed output definitions".to_string()],
            },
            ProgressEvent::ChangesApplied { files_written: 0 },
            ProgressEvent::Failed {
                error: "x".to_string(),
            },
        ];
        for event in &events {
            handler.on_progress(event);
        }
    }
}
