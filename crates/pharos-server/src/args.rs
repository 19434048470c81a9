//! Command-line argument definitions using clap

use std::path::PathBuf;

use clap::Parser;

/// HTTP server for the Pharos operation plan engine
#[derive(Parser, Debug)]
#[command(name = "pharosd", version, about)]
pub struct Args {
    /// Path to the plan database file (defaults to the XDG data directory)
    #[arg(long)]
    pub database_file: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, default_value_t = 8484)]
    pub port: u16,
}
