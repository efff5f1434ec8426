//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sqlnode - keep derived SQL objects in step with their declarations
#[derive(Parser, Debug)]
#[command(name = "sn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output (logs every SQL statement)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// PostgreSQL connection string, overriding database.url in sqlnode.yml
    #[arg(long, global = true, env = "SQLNODE_DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the project and check every pipeline's dependencies
    Validate(ValidateArgs),

    /// List declared nodes with their kind, dependencies and fingerprint
    Ls(LsArgs),

    /// Show what a refresh would do, without changing anything
    Plan(PlanArgs),

    /// Reconcile the database with the declared pipelines
    Refresh(RefreshArgs),
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Only validate this pipeline
    #[arg(long)]
    pub pipeline: Option<String>,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only list nodes of this pipeline
    #[arg(long)]
    pub pipeline: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Only plan this pipeline
    #[arg(long)]
    pub pipeline: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Exit with status 2 when a refresh would drop or create anything
    #[arg(long)]
    pub exit_code: bool,
}

/// Arguments for the refresh command
#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Only refresh this pipeline
    #[arg(long)]
    pub pipeline: Option<String>,

    /// Output format for the run summary
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Suppress the progress spinner
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
