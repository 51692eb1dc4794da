use bytes::BytesMut;
use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::tcp::{OwnedReadHalf, OwnedWriteHalf},
};
use tracing::{debug, trace};

use crate::errors::{ConnectionError, Result};

use super::line_buffer::{LineBuffer, frame_line};

// -----------------------------------------------------------------------------
// ----- LineReader ------------------------------------------------------------

/// Receiving side of a connection: raw reads in, whole lines out.
#[derive(Debug)]
pub struct LineReader {
    stream: OwnedReadHalf,
    inbox: LineBuffer,
    eof: bool,
}

impl LineReader {
    pub(crate) fn new(stream: OwnedReadHalf, capacity: usize) -> Self {
        Self {
            stream,
            inbox: LineBuffer::with_capacity(capacity),
            eof: false,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- LineReader: Public ----------------------------------------------------

impl LineReader {
    /// Wait for the next line and return it without its terminator.
    ///
    /// An unterminated tail is handed out once the peer finishes its side;
    /// after that every call fails with `ConnectionClosed`. Cancel-safe: bytes
    /// read before a cancellation stay buffered for the next call.
    pub async fn receive_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = self.inbox.next_line() {
                return line.map_err(ConnectionError::ReceiveFailed);
            }

            if self.eof {
                return match self.inbox.take_remainder() {
                    Some(line) => line.map_err(ConnectionError::ReceiveFailed),
                    None => Err(ConnectionError::ConnectionClosed),
                };
            }

            let n = self
                .stream
                .read_buf(self.inbox.read_target())
                .await
                .map_err(ConnectionError::ReceiveFailed)?;

            if n == 0 {
                debug!("peer closed its side of the stream");
                self.eof = true;
            } else {
                trace!(bytes = n, "read from stream");
            }
        }
    }

    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.local_addr()
    }
}

// -----------------------------------------------------------------------------
// ----- LineWriter ------------------------------------------------------------

/// Sending side of a connection. Every line is flushed before `send` returns.
#[derive(Debug)]
pub struct LineWriter {
    stream: OwnedWriteHalf,
    outbox: BytesMut,
}

impl LineWriter {
    pub(crate) fn new(stream: OwnedWriteHalf, capacity: usize) -> Self {
        Self {
            stream,
            outbox: BytesMut::with_capacity(capacity),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- LineWriter: Public ----------------------------------------------------

impl LineWriter {
    /// Write `message` followed by `\n` and flush.
    ///
    /// Cancel-safe with respect to framing: whatever a cancelled call left
    /// unwritten goes out first, so line boundaries are never merged.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        self.drain_outbox().await?;
        frame_line(&mut self.outbox, message);

        self.drain_outbox().await?;
        self.stream
            .flush()
            .await
            .map_err(ConnectionError::SendFailed)?;

        trace!(bytes = message.len() + 1, "line sent");
        Ok(())
    }

    /// Finish whatever a cancelled `send` left behind, then close the write side.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.drain_outbox().await?;

        self.stream
            .shutdown()
            .await
            .map_err(ConnectionError::SendFailed)
    }

    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }
}

// -----------------------------------------------------------------------------
// ----- LineWriter: Private ---------------------------------------------------

impl LineWriter {
    async fn drain_outbox(&mut self) -> Result<()> {
        if self.outbox.is_empty() {
            return Ok(());
        }

        self.stream
            .write_all_buf(&mut self.outbox)
            .await
            .map_err(ConnectionError::SendFailed)
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
