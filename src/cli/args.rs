//! CLI argument parsing

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate UML class diagrams from Python codebases
#[derive(Parser, Debug)]
#[command(name = "umlizer")]
#[command(about = "Generate UML class diagrams from Python codebases")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract classes and write a class diagram
    Class {
        /// Python file or directory to analyze
        source: PathBuf,

        /// Output path without extension [default: classes]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (dot, png, svg, pdf, json)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Substrings or glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report every included class and show progress
        #[arg(short, long)]
        verbose: bool,

        /// Log filter (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Show version information
    Version,
}
