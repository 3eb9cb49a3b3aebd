//! Command line configuration.

use std::{net::IpAddr, path::PathBuf};

use clap::Parser;

use crate::domain::HISTORY_PAGE_SIZE;

#[derive(Parser, Debug, Clone)]
#[command(name = "hibiki-server")]
#[command(about = "Real-time room chat relay over WebSocket", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    pub port: u16,

    /// SQLite database file for messages (kept in memory when omitted)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Moderator IP address allowed to delete any message and clear rooms (repeatable)
    #[arg(long = "moderator", value_name = "IP")]
    pub moderators: Vec<IpAddr>,

    /// Number of messages sent on join and served by the history endpoint (at most 100)
    #[arg(long, default_value_t = HISTORY_PAGE_SIZE)]
    pub history_limit: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl ServerConfig {
    /// History limit clamped to `1..=HISTORY_PAGE_SIZE`
    pub fn history_limit(&self) -> usize {
        self.history_limit.clamp(1, HISTORY_PAGE_SIZE)
    }
}
