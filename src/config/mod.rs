pub mod cli;
pub mod connection;
pub mod types;

pub use cli::CliConfig;
pub use connection::{ConfigError, ConnectionConfig};
pub use types::LogLevel;
