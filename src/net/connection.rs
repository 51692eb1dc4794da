use std::{future::Future, io, mem, net::SocketAddr, time::Duration};
use tokio::{net::TcpStream, time};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::errors::{ConnectionError, Result};

use super::{
    halves::{LineReader, LineWriter},
    state::{Channel, ConnectionState, StateKind},
};

// -----------------------------------------------------------------------------
// ----- Connection ------------------------------------------------------------

/// One TCP stream carrying newline-terminated UTF-8 text in both directions.
///
/// Lifecycle is `Unconnected -> Connected -> Closed`, and `Closed` is final.
/// Dropping a connected `Connection` closes the socket, so scope exit (normal
/// or unwinding) always releases it. Prefer `disconnect().await` when you can,
/// since it also shuts the write side down gracefully.
#[derive(Debug)]
pub struct Connection {
    state: ConnectionState,
    config: ConnectionConfig,
}

// -----------------------------------------------------------------------------
// ----- Connection: Static ----------------------------------------------------

impl Connection {
    pub fn new() -> Self {
        Self::with_config(ConnectionConfig::default())
    }

    pub fn with_config(config: ConnectionConfig) -> Self {
        Self {
            state: ConnectionState::Unconnected,
            config,
        }
    }

    /// Wrap a stream that is already connected, e.g. one from `accept`.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self::from_stream_with_config(stream, ConnectionConfig::default())
    }

    pub fn from_stream_with_config(stream: TcpStream, config: ConnectionConfig) -> Self {
        let channel = Channel::open(stream, &config);

        Self {
            state: ConnectionState::Connected(channel),
            config,
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// ----- Connection: Public ----------------------------------------------------

impl Connection {
    /// Open a stream to `host:port`.
    ///
    /// On failure the connection stays `Unconnected` and may be retried.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let target = format!("{host}:{port}");
        self.establish(target, TcpStream::connect((host, port))).await
    }

    /// True while connected and the socket still has a peer. Never fails.
    pub fn is_connected(&self) -> bool {
        match &self.state {
            ConnectionState::Connected(channel) => channel.reader.peer_addr().is_ok(),
            _ => false,
        }
    }

    /// Write `message` plus `\n` and flush it.
    ///
    /// Embedded `\n` characters are not escaped; the peer will read one line
    /// per segment.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        self.channel_mut()?.writer.send(message).await
    }

    /// Wait for the next line from the peer, without its terminator.
    ///
    /// A trailing `\r` before the `\n` is dropped. Fails with
    /// `ConnectionClosed` once the peer has finished sending.
    pub async fn receive_line(&mut self) -> Result<String> {
        self.channel_mut()?.reader.receive_line().await
    }

    /// Shut down and release the stream. Safe to call any number of times.
    pub async fn disconnect(&mut self) {
        match mem::replace(&mut self.state, ConnectionState::Closed) {
            ConnectionState::Connected(channel) => {
                channel.close().await;
                debug!("connection closed");
            }
            ConnectionState::Unconnected | ConnectionState::Closed => {}
        }
    }

    /// Hand out independent halves so reading and writing can happen on
    /// different tasks.
    pub fn into_split(mut self) -> Result<(LineReader, LineWriter)> {
        match mem::replace(&mut self.state, ConnectionState::Closed) {
            ConnectionState::Connected(channel) => Ok((channel.reader, channel.writer)),
            ConnectionState::Unconnected => Err(ConnectionError::NotConnected),
            ConnectionState::Closed => Err(ConnectionError::AlreadyClosed),
        }
    }

    pub fn state(&self) -> StateKind {
        self.state.kind()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            ConnectionState::Connected(channel) => channel.reader.peer_addr().ok(),
            _ => None,
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            ConnectionState::Connected(channel) => channel.reader.local_addr().ok(),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Connection: Private ---------------------------------------------------

impl Connection {
    fn channel_mut(&mut self) -> Result<&mut Channel> {
        match &mut self.state {
            ConnectionState::Connected(channel) => Ok(channel),
            _ => Err(ConnectionError::NotConnected),
        }
    }

    /// Drive a connect attempt under the configured timeout. Only an
    /// `Unconnected` connection gets as far as polling `attempt`.
    async fn establish<F>(&mut self, target: String, attempt: F) -> Result<()>
    where
        F: Future<Output = io::Result<TcpStream>>,
    {
        match self.state {
            ConnectionState::Unconnected => {}
            ConnectionState::Connected(_) => return Err(ConnectionError::AlreadyConnected),
            ConnectionState::Closed => return Err(ConnectionError::AlreadyClosed),
        }

        let stream = match within(self.config.connect_timeout, attempt).await {
            Ok(stream) => stream,
            Err(source) => return Err(ConnectionError::Connect { target, source }),
        };

        debug!("connected to {target} ({})", describe_addr(stream.peer_addr()));

        self.state = ConnectionState::Connected(Channel::open(stream, &self.config));
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Connection: Drop ------------------------------------------------------

impl Drop for Connection {
    fn drop(&mut self) {
        let state = mem::replace(&mut self.state, ConnectionState::Closed);
        if let ConnectionState::Connected(_) = state {
            debug!("connection dropped while connected; socket released");
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

async fn within<T, F>(limit: Option<Duration>, attempt: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    let Some(limit) = limit else {
        return attempt.await;
    };

    match time::timeout(limit, attempt).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no connection within {limit:?}"),
        )),
    }
}

fn describe_addr(addr: io::Result<SocketAddr>) -> String {
    match addr {
        Ok(addr) => addr.to_string(),
        Err(e) => format!("peer unknown: {e}"),
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
