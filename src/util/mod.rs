//! Process-level helpers shared by the binary and embedding callers

pub mod logging;

pub use logging::{init_from_env, init_logging, parse_level, LoggingConfig};
