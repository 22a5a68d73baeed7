use remediator::cli::commands::{CliArgs, Commands};
use remediator::cli::handlers::{
    handle_apply, handle_config, handle_plan, handle_scan, handle_validate,
};
use remediator::util::logging::{init_logging, parse_level, LoggingConfig};
use remediator::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("remediator v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Scan(scan_args) => handle_scan(scan_args),
        Commands::Plan(plan_args) => handle_plan(plan_args),
        Commands::Apply(apply_args) => handle_apply(apply_args),
        Commands::Validate(validate_args) => handle_validate(validate_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str).unwrap_or_else(|| {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        })
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        env::var("REMEDIATOR_LOG_LEVEL")
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(Level::INFO)
    };

    init_logging(LoggingConfig {
        level,
        use_json: args.log_json,
        ..Default::default()
    });
}
