//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// editkit - template expansion, reindentation and process supervision
#[derive(Parser)]
#[command(
    name = "ek",
    about = "Template expansion, reindentation and supervised helper processes",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Override the configured style profile
    #[arg(short, long, global = true)]
    pub style: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand a template, prompting on the terminal
    Expand {
        /// Template name
        name: String,
    },

    /// Reindent a file and print the result
    Reindent {
        /// File to reindent
        file: PathBuf,

        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        in_place: bool,
    },

    /// Launch a command, wait for it and print its output
    Launch {
        /// Command line to run (not passed through a shell)
        command: String,
    },

    /// List available templates
    Templates,

    /// List available style profiles
    Profiles,
}
