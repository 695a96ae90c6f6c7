pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hush")]
#[command(about = "Share a secret over any channel without the channel seeing it")]
pub struct Args {
    /// Path to the hush config directory (defaults to ~/.hush)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level for stderr output (defaults to the config value; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: crate::Command,
}
