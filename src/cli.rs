use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed operations dashboard for event planning.
/// State is stored in ~/.opsdash or the directory passed via --dir.
#[derive(Parser)]
#[command(name = "opsdash", version, about = "Event operations dashboard: task boards, sponsorship pipeline and revenue summary")]
pub struct Cli {
    /// Data directory holding tasks.json, settings.json and config.toml.
    #[arg(long, global = true, env = "OPSDASH_DIR")]
    pub dir: Option<PathBuf>,

    /// Access passcode, required when a secret is configured.
    #[arg(long, global = true, env = "OPSDASH_PASSCODE", hide_env_values = true)]
    pub passcode: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
