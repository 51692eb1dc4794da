pub mod config;
pub mod errors;
pub mod net;

pub use config::ConnectionConfig;
pub use errors::{ConnectionError, Result};
pub use net::{Connection, LineReader, LineWriter, StateKind};
