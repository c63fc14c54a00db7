//! CLI argument parsing for yst

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "yst")]
#[command(author, version, about = "Render compiled YST string templates", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a template from a compiled bundle
    Render {
        /// Compiled bundle (JSON)
        #[arg(required = true)]
        bundle: PathBuf,

        /// Template to render
        #[arg(required = true)]
        name: String,

        /// Data file: a JSON array, or an object whose keys become globals
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Params object passed to the template, as JSON
        #[arg(short, long)]
        params: Option<String>,

        /// Insert expression results without HTML encoding
        #[arg(long)]
        literal: bool,

        /// Propagate errors instead of rendering error panels
        #[arg(long)]
        strict: bool,

        /// Allow space-separated multi-set expressions
        #[arg(long)]
        multi_set: bool,
    },

    /// Pretty-print templates of a bundle
    Print {
        /// Compiled bundle (JSON)
        #[arg(required = true)]
        bundle: PathBuf,

        /// Only print this template
        name: Option<String>,
    },

    /// Parse every expression of a bundle and report problems
    Check {
        /// Compiled bundle (JSON)
        #[arg(required = true)]
        bundle: PathBuf,
    },
}
