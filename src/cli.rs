use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pscguard",
    version,
    about = "Weighted compliance scoring for Port State Control inspection findings"
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score a findings file or a directory of findings files
    Score(RunArgs),
    /// Write a default pscguard.toml into the current directory
    Init,
    /// Print the color token for a risk level or a score
    Colors(ColorsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ColorsArgs {
    /// Risk level label (low, medium, high, critical) or numeric score
    pub value: String,
}
