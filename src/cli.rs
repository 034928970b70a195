use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meetwise - attendee name resolution for meeting scheduling
#[derive(Debug, Parser)]
#[command(name = "meetwise")]
#[command(about = "Resolve spoken attendee names against a people directory", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive mode)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV roster (id, full_name, email_address) to use instead of the configured one
    #[arg(long, global = true)]
    pub roster: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve one or more attendee names
    Resolve {
        /// Names to resolve
        #[arg(required = true)]
        names: Vec<String>,

        /// Print the resolution summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check roster, embedder and resolver
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assemble the final meeting record from model output
    Assemble {
        /// File holding the extracted meeting request (JSON, possibly wrapped in prose)
        #[arg(long)]
        request: PathBuf,

        /// File holding the proposed schedule window (JSON, possibly wrapped in prose)
        #[arg(long)]
        schedule: PathBuf,

        /// Invitation e-mail body; the request's purpose is used when empty
        #[arg(long, default_value = "")]
        body: String,
    },

    /// List the loaded roster
    #[command(alias = "people")]
    Roster,

    /// Show the effective configuration
    Config,
}
