//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate API documentation entries from TypeScript modules
#[derive(Parser, Debug)]
#[command(name = "gendoc")]
#[command(about = "Generate API documentation entries from TypeScript modules")]
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
    /// Document everything reachable from a root module's exports
    Generate {
        /// Root TypeScript file (defaults to project.root from the config)
        root: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory non-relative module specifiers are resolved against
        #[arg(long)]
        base_url: Option<PathBuf>,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Attach source locators to entries
        #[arg(long)]
        source_locators: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}
