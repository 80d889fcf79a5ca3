//! [`Args`] definitions.

use clap::Parser;

/// Server of the boat-tour booking system.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file, which may be absent.
    #[arg(short, long, default_value = "config.toml", value_name = "PATH")]
    pub config: String,
}

impl Args {
    /// Parses [`Args`] of the current process.
    ///
    /// # Errors
    ///
    /// If the arguments are malformed, or `--help` or `--version` is
    /// requested.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}
