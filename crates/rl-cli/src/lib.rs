//! repoload command-line interface

pub mod commands;
pub mod config;
pub mod version;

// Re-export CLI types for testing
pub use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "repoload")]
#[command(about = "Query gerrit and download CR with repo")]
#[command(disable_version_flag = true, long_about = None)]
pub struct Cli {
    /// Show version of program
    #[arg(long)]
    pub version: bool,

    /// Enable debug output (e.g. responses from gerrit queries)
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all Change Requests.
    #[command(visible_alias = "c")]
    Changes,
    /// List all topics.
    #[command(visible_alias = "t")]
    Topics,
    /// Download a single Change (number) request or a whole topic (name).
    #[command(visible_alias = "d")]
    Download(commands::DownloadArgs),
}
