// crates/server/src/cli.rs
//! Command-line interface definition for chat-analytics.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Local dashboard for ChatGPT `conversations.json` exports.
///
/// Without a subcommand, starts the web server.
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-analytics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web server
    Serve(ServeArgs),

    /// Analyze an export file and print the result
    Report {
        /// Path to conversations.json
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Cut a small demo dataset out of a full export
    Demo {
        /// Path to the full conversations.json
        input: PathBuf,

        /// Where to write the demo export
        output: PathBuf,

        /// Keep conversations from the last N months
        #[arg(long, default_value_t = 3)]
        months: u32,

        /// Keep at most this many conversations
        #[arg(long, default_value_t = 200)]
        max: usize,

        /// Truncate message parts to this many characters
        #[arg(long, default_value_t = 500)]
        truncate: usize,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides CHAT_ANALYTICS_PORT / PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (overrides CHAT_ANALYTICS_HOST)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Directory with the built frontend (overrides STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Open the dashboard in a browser once the server is listening
    #[arg(long)]
    pub open: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}
