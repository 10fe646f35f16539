use std::path::PathBuf;

use clap::Parser;

/// Songsmith compose server
#[derive(Debug, Parser)]
#[command(name = "songsmith", about = "Turns song briefs into generated audio tracks")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "songsmith.toml", env = "SONGSMITH_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "SONGSMITH_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info", env = "SONGSMITH_LOG")]
    pub log: String,
}
