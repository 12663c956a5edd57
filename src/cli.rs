//! CLI argument parsing for markbook

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mb")]
#[command(author, version, about = "Interactive report card comment generator", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Student roster file (prompted for when omitted)
    #[arg(short, long)]
    pub roster: Option<PathBuf>,

    /// Comment template file (prompted for when omitted)
    #[arg(short = 't', long)]
    pub comments: Option<PathBuf>,

    /// Report output file (defaults to the configured path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
