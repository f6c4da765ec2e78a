//! CLI argument parsing for quill.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(name = "quill")]
#[command(about = "Render streamed model output as a structured document")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Input file (defaults to stdin)
    pub input: Option<PathBuf>,

    /// Output file; written repeatedly while the stream is live
    /// (defaults to stdout, written once at end of stream)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Treat input lines as SSE events instead of raw text
    #[arg(long)]
    pub events: bool,

    /// Emit parsed segments and the search ledger as JSON instead of HTML
    #[arg(long)]
    pub json: bool,

    /// Wrap output in a standalone HTML page
    #[arg(long)]
    pub standalone: bool,

    /// Override the code highlighting theme
    #[arg(long, value_name = "THEME")]
    pub theme: Option<String>,
}
