use clap::{Parser, Subcommand, Args};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "statement-finder", version, about = "Find client statements and export CSV + ZIP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress and summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan manager folders and export matching statements
    Find(FindArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct FindArgs {
    /// YAML configuration file (missing file means defaults)
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Override: base directory with manager folders
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Override: output directory for CSV/ZIP
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Year folder, for example 2024. Empty means all
    #[arg(short, long, default_value = "")]
    pub year: String,

    /// Month folder name, for example 03-March. Empty means all
    #[arg(short, long, default_value = "")]
    pub month: String,

    /// Comma separated client names. Empty scans the unassigned bucket
    #[arg(long, default_value = "")]
    pub clients: String,

    /// Comma separated statement types, for example K-1,CC,STMT
    #[arg(short, long, default_value = "")]
    pub types: String,

    /// Max scan workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Override: activity log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: PathBuf,
}
