pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{
    ApplyArgs, CliArgs, Commands, ConfigArgs, PlanArgs, ScanArgs, SelectionOverrides,
    ValidateArgs,
};
pub use output::{OutputFormat, OutputFormatter, ScanReport};
