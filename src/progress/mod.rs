//! Progress reporting for remediation runs
//!
//! Components receive an `Arc<dyn ProgressHandler>` at construction time and
//! record structured events through it; nothing reaches for global state.

mod handler;
mod logging;

pub use handler::{NoOpHandler, ProgressEvent, ProgressHandler, RecordingHandler};
pub use logging::LoggingHandler;
