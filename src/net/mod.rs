// net/mod.rs
//! Networking layer: a line-oriented connection over a single TCP stream.

pub mod connection;
pub mod halves;
pub mod state;

pub(crate) mod line_buffer;

pub use connection::Connection;
pub use halves::{LineReader, LineWriter};
pub use state::StateKind;
