use std::io;
use thiserror::Error;

// -----------------------------------------------------------------------------
// ----- Result ----------------------------------------------------------------

pub type Result<T, E = ConnectionError> = std::result::Result<T, E>;

// -----------------------------------------------------------------------------
// ----- ConnectionError -------------------------------------------------------

/// Everything a `Connection` can report back to its caller.
///
/// Teardown never produces one of these: `disconnect` swallows and logs.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection is already established")]
    AlreadyConnected,

    #[error("connection has been closed and cannot be reused")]
    AlreadyClosed,

    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("connection is not established")]
    NotConnected,

    #[error("failed to send line: {0}")]
    SendFailed(#[source] io::Error),

    #[error("failed to receive line: {0}")]
    ReceiveFailed(#[source] io::Error),

    #[error("connection closed by peer")]
    ConnectionClosed,
}

// -----------------------------------------------------------------------------
// ----- ConnectionError: Public -----------------------------------------------

impl ConnectionError {
    /// The operation needed a live connection and there was none.
    pub fn is_not_connected(&self) -> bool {
        matches!(
            self,
            ConnectionError::NotConnected | ConnectionError::AlreadyClosed
        )
    }

    /// The peer ended the stream in an orderly way. Treat as end-of-data.
    pub fn is_peer_closed(&self) -> bool {
        matches!(self, ConnectionError::ConnectionClosed)
    }

    /// The transport failed underneath an otherwise valid call.
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            ConnectionError::Connect { .. }
                | ConnectionError::SendFailed(_)
                | ConnectionError::ReceiveFailed(_)
        )
    }

    /// Underlying transport error, if there is one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            ConnectionError::Connect { source, .. } => Some(source),
            ConnectionError::SendFailed(e) | ConnectionError::ReceiveFailed(e) => Some(e),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
