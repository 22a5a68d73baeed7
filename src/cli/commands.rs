use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Safe, scoped remediation of Terraform repositories
#[derive(Parser, Debug)]
#[command(
    name = "remediator",
    about = "Safe, scoped remediation of Terraform repositories",
    version,
    author,
    long_about = "remediator narrows a Terraform/HCL checkout down to the files a \
                  remediation intent is about, builds the context handed to a change \
                  generator, and applies proposed full-file replacements only after \
                  checking that no critical configuration would be lost."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit log records as JSON on stderr")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Inventory definition, manifest and module files",
        long_about = "Walks the repository, classifies infrastructure files and resolves \
                      local module sources declared in root files.\n\n\
                      Examples:\n  \
                      remediator scan ./infra\n  \
                      remediator scan ./infra --format json"
    )]
    Scan(ScanArgs),

    #[command(
        about = "Select candidate files and build the generation context",
        long_about = "Classifies the intent's resource type, finds the files that mention \
                      the affected resources and loads their contents under the context \
                      budget.\n\n\
                      Examples:\n  \
                      remediator plan ./infra --intent SEC-42.json\n  \
                      cat SEC-42.json | remediator plan ./infra --intent - --format json"
    )]
    Plan(PlanArgs),

    #[command(
        about = "Validate and write a proposed change",
        long_about = "Parses a {\"files\": {path: content}} payload, rejects it if any \
                      sensitive root file would lose critical blocks, writes it, and \
                      drafts the pull request. Nothing is written when any check fails.\n\n\
                      Examples:\n  \
                      remediator apply ./infra --intent SEC-42.json --payload fix.json\n  \
                      generator | remediator apply ./infra --intent SEC-42.json --payload -"
    )]
    Apply(ApplyArgs),

    #[command(
        about = "Check one proposed replacement against its original",
        long_about = "Runs the structural-loss rules on a single file pair without touching \
                      any repository.\n\n\
                      Examples:\n  \
                      remediator validate main.tf main.tf.new"
    )]
    Validate(ValidateArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

/// Overrides for the environment-derived selection settings
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionOverrides {
    #[arg(long, value_name = "N", help = "Maximum number of candidate files loaded")]
    pub max_files: Option<usize>,

    #[arg(long, value_name = "CHARS", help = "Combined character budget for candidate contents")]
    pub max_context_chars: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(value_name = "REPO", default_value = ".", help = "Path to the repository checkout")]
    pub repository_path: PathBuf,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    #[arg(value_name = "REPO", help = "Path to the repository checkout")]
    pub repository_path: PathBuf,

    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        help = "Remediation intent as JSON ('-' reads stdin)"
    )]
    pub intent: PathBuf,

    #[arg(
        short = 't',
        long,
        value_name = "TYPE",
        help = "Skip classification and use this resource type"
    )]
    pub resource_type: Option<String>,

    #[command(flatten)]
    pub overrides: SelectionOverrides,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    #[arg(value_name = "REPO", help = "Path to the repository checkout")]
    pub repository_path: PathBuf,

    #[arg(short = 'i', long, value_name = "FILE", help = "Remediation intent as JSON")]
    pub intent: PathBuf,

    #[arg(
        short = 'p',
        long,
        value_name = "FILE",
        help = "Proposed change payload ('-' reads stdin)"
    )]
    pub payload: PathBuf,

    #[arg(long, help = "Count untracked files as changes")]
    pub untracked: bool,

    #[arg(long, help = "Run `terraform fmt` on written .tf files")]
    pub terraform_fmt: bool,

    #[arg(long, help = "Name the branch YYYY-MM-DD-HHMMSS-<TICKET> (UTC)")]
    pub timestamp_branch: bool,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "ORIGINAL", help = "Current file content")]
    pub original: PathBuf,

    #[arg(value_name = "PROPOSED", help = "Proposed replacement")]
    pub proposed: PathBuf,

    #[arg(long, value_name = "PATH", help = "Name to report (defaults to ORIGINAL's filename)")]
    pub path: Option<String>,

    #[arg(long, value_name = "RATIO", help = "Override the minimum size ratio")]
    pub min_size_ratio: Option<f64>,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
