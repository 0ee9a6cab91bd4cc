use std::path::PathBuf;

use clap::Parser;

/// Polls a reservation platform and prints confirmation links for open slots.
#[derive(Debug, Parser)]
#[command(name = "slotgrab", version, about)]
pub struct Args {
    /// Configuration file (YAML, or TOML by extension).
    #[arg(short, long, env = "SLOTGRAB_CONFIG", default_value = "config.yml")]
    pub config: PathBuf,

    /// Make a single acquisition even when the config enables polling.
    #[arg(long)]
    pub once: bool,

    /// Emit debug dumps regardless of `debugMode`.
    #[arg(long)]
    pub debug: bool,
}
