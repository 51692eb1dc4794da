use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

use linewire::Connection;

pub const LOOPBACK: &str = "127.0.0.1";

// Bind an ephemeral loopback port for a peer to accept on.
pub async fn bind_peer() -> (TcpListener, u16) {
    let listener = TcpListener::bind((LOOPBACK, 0))
        .await
        .expect("bind ephemeral port");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

// A fresh Connection connected to an accepted raw peer socket.
pub async fn connected_pair() -> (Connection, TcpStream, SocketAddr) {
    let (listener, port) = bind_peer().await;

    let mut conn = Connection::new();
    conn.connect(LOOPBACK, port).await.expect("connect to peer");

    let (peer, addr) = listener.accept().await.expect("accept connection");
    (conn, peer, addr)
}
