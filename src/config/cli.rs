use clap::Parser;
use std::path::PathBuf;

use super::types::LogLevel;

// -----------------------------------------------------------------------------
// ----- CliConfig -------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub config_file_location: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl CliConfig {
    /// Parse argv + env. Exits the process with clap's usage on bad input.
    pub fn from_args() -> Self {
        Self::from(Args::parse())
    }
}

impl From<Args> for CliConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            config_file_location: args.config_file,
            log_level: args.log_level,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "linewire",
    version,
    about = "Exchange newline-delimited text with a TCP peer"
)]
pub struct Args {
    // Hostname or IP literal. Required via CLI or ENV.
    #[arg(long = "host", short = 'H', env = "LINEWIRE_HOST")]
    host: String,

    // Required via CLI or ENV.
    #[arg(long = "port", short = 'p', env = "LINEWIRE_PORT")]
    port: u16,

    // Not required via CLI or ENV (defaults to info).
    #[arg(long = "log", default_value = "info")]
    log_level: LogLevel,

    // Optional; connection defaults apply without it.
    #[arg(long = "config", env = "LINEWIRE_CONFIG_FILE")]
    config_file: Option<PathBuf>,
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
