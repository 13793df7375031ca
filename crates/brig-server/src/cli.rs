use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `brig` binary.
#[derive(Debug, Parser)]
#[command(name = "brig", version, about = "Brig - business-management backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra TOML config file, merged over the global and project files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },

    /// Write the audit log to a JSON-lines file
    ExportAudit {
        /// Output file
        #[arg(long)]
        out: PathBuf,

        /// Only entries whose type, id, or actor contains this text
        #[arg(long)]
        search: Option<String>,
    },
}
