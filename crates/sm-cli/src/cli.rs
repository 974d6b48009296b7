//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// SalesMart - clean raw sales, customer and product files and load them
/// into a star-schema warehouse
#[derive(Parser, Debug)]
#[command(name = "sm")]
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
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target from salesmart.yml (falls back to SM_TARGET)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrub raw files and write prepared CSVs
    Prepare(PrepareArgs),

    /// Scrub raw files and load the warehouse tables
    Run(RunArgs),

    /// List the warehouse tables and their column mappings
    Ls(LsArgs),
}

/// Arguments for the prepare command
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Entities to prepare (comma-separated: customer,product,sale; default: all)
    #[arg(short, long)]
    pub entities: Option<String>,

    /// Override the prepared output directory
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Also write prepared CSVs to the prepared directory
    #[arg(long)]
    pub write_prepared: bool,

    /// Output format for the run summary
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: RunOutput,
}

/// Run summary formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutput {
    /// Human-readable summary
    Text,
    /// JSON report
    Json,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,

    /// Only list this entity
    #[arg(short, long)]
    pub entity: Option<String>,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
