use std::fmt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;

use super::halves::{LineReader, LineWriter};

// -----------------------------------------------------------------------------
// ----- ConnectionState -------------------------------------------------------

/// Where a `Connection` is in its lifecycle.
///
/// The buffers live inside `Connected`, so there is no way to hold them
/// without a stream or to hold a stream without them.
#[derive(Debug)]
pub(crate) enum ConnectionState {
    Unconnected,
    Connected(Channel),
    Closed,
}

impl ConnectionState {
    pub(crate) fn kind(&self) -> StateKind {
        match self {
            ConnectionState::Unconnected => StateKind::Unconnected,
            ConnectionState::Connected(_) => StateKind::Connected,
            ConnectionState::Closed => StateKind::Closed,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- StateKind -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Unconnected,
    Connected,
    Closed,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StateKind::Unconnected => "unconnected",
            StateKind::Connected => "connected",
            StateKind::Closed => "closed",
        };
        f.write_str(s)
    }
}

// -----------------------------------------------------------------------------
// ----- Channel ---------------------------------------------------------------

/// A live stream split into its buffered line halves.
#[derive(Debug)]
pub(crate) struct Channel {
    pub(crate) reader: LineReader,
    pub(crate) writer: LineWriter,
}

impl Channel {
    pub(crate) fn open(stream: TcpStream, config: &ConnectionConfig) -> Self {
        if let Err(e) = stream.set_nodelay(config.nodelay) {
            debug!("set_nodelay({}) failed: {e}", config.nodelay);
        }

        let (reader, writer) = stream.into_split();

        Self {
            reader: LineReader::new(reader, config.read_buffer_capacity),
            writer: LineWriter::new(writer, config.write_buffer_capacity),
        }
    }

    /// Graceful teardown. Failures are logged, never returned.
    pub(crate) async fn close(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            warn!("error while shutting down connection: {e}");
        }
        // Dropping the halves releases the socket.
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
