//! Command-line interface for strictly_server.

use crate::config::DisconnectPolicy;
use clap::Parser;

/// Strictly Mastermind - two-player number guessing over WebSocket
#[derive(Parser, Debug)]
#[command(name = "strictly_server")]
#[command(about = "Real-time number mastermind game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults are used if it does not exist)
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// What to do with a player's match when its socket closes
    #[arg(long, value_enum)]
    pub disconnect_policy: Option<DisconnectPolicy>,
}
