mod support;

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

use linewire::{Connection, ConnectionError};

#[tokio::test]
async fn hello_world_round_trip() {
    let (mut conn, mut peer, addr) = support::connected_pair().await;
    assert_eq!(conn.local_addr(), Some(addr));

    conn.send("hello").await.expect("send hello");

    let mut wire = [0u8; 6];
    peer.read_exact(&mut wire).await.expect("peer reads");
    assert_eq!(&wire, b"hello\n");

    peer.write_all(b"world\n").await.expect("peer replies");
    assert_eq!(conn.receive_line().await.expect("receive"), "world");

    conn.disconnect().await;
}

#[tokio::test]
async fn plain_messages_arrive_verbatim() {
    let (mut conn, peer, _) = support::connected_pair().await;
    let mut lines = BufReader::new(peer).lines();

    let messages = [
        "",
        "x",
        "spaces   and\ttabs",
        "unicode: žluťoučký kůň 🦀",
    ];

    for m in messages {
        conn.send(m).await.unwrap();
    }
    for m in messages {
        let got = lines.next_line().await.unwrap().expect("line");
        assert_eq!(got, m);
    }
}

#[tokio::test]
async fn embedded_newlines_split_on_the_peer() {
    let (mut conn, peer, _) = support::connected_pair().await;
    let mut lines = BufReader::new(peer).lines();

    conn.send("one\ntwo\n\nfour").await.unwrap();

    for expected in ["one", "two", "", "four"] {
        assert_eq!(lines.next_line().await.unwrap().unwrap(), expected);
    }
}

#[tokio::test]
async fn lines_are_received_in_stream_order_across_chunks() {
    let (mut conn, mut peer, _) = support::connected_pair().await;

    let writer = tokio::spawn(async move {
        for chunk in [&b"al"[..], b"pha\nbe", b"ta\r", b"\ngamma\n"] {
            peer.write_all(chunk).await.unwrap();
            peer.flush().await.unwrap();
            tokio::task::yield_now().await;
        }
        peer
    });

    assert_eq!(conn.receive_line().await.unwrap(), "alpha");
    assert_eq!(conn.receive_line().await.unwrap(), "beta");
    assert_eq!(conn.receive_line().await.unwrap(), "gamma");

    let _peer = writer.await.unwrap();
}

#[tokio::test]
async fn large_line_is_reassembled() {
    let (mut conn, peer, _) = support::connected_pair().await;
    let big = "z".repeat(256 * 1024);

    let (peer_read, mut peer_write) = peer.into_split();
    let payload = big.clone();
    let writer = tokio::spawn(async move {
        peer_write.write_all(payload.as_bytes()).await.unwrap();
        peer_write.write_all(b"\n").await.unwrap();
        peer_write
    });

    let got = conn.receive_line().await.unwrap();
    assert_eq!(got.len(), big.len());
    assert_eq!(got, big);

    drop(peer_read);
    let _ = writer.await.unwrap();
}

#[tokio::test]
async fn cancelled_send_keeps_line_boundaries() {
    let (mut conn, mut peer, _) = support::connected_pair().await;
    let big = "z".repeat(32 * 1024 * 1024);

    // Nobody reads yet, so the socket buffers fill and the send stalls.
    let stalled = tokio::time::timeout(Duration::from_millis(200), conn.send(&big)).await;
    assert!(stalled.is_err(), "send finished against a peer that never read");

    let reader = tokio::spawn(async move {
        let mut all = Vec::new();
        peer.read_to_end(&mut all).await.unwrap();
        all
    });

    conn.send("next").await.expect("send after cancellation");
    conn.disconnect().await;

    let text = String::from_utf8(reader.await.unwrap()).unwrap();
    let lines: Vec<&str> = text.split_terminator('\n').collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), big.len());
    assert!(lines[0].bytes().all(|b| b == b'z'));
    assert_eq!(lines[1], "next");
}

#[tokio::test]
async fn invalid_utf8_is_a_receive_failure() {
    let (mut conn, mut peer, _) = support::connected_pair().await;
    peer.write_all(b"\xc3\x28\nok\n").await.unwrap();

    let err = conn.receive_line().await.unwrap_err();
    assert!(matches!(err, ConnectionError::ReceiveFailed(_)));
    assert!(err.is_io_failure());

    assert_eq!(conn.receive_line().await.unwrap(), "ok");
}

#[tokio::test]
async fn two_connections_talk_to_each_other() {
    let (listener, port) = support::bind_peer().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut conn = Connection::from_stream(stream);
        while let Ok(line) = conn.receive_line().await {
            conn.send(&line.to_uppercase()).await.unwrap();
        }
        conn.disconnect().await;
    });

    let mut client = Connection::new();
    client.connect(support::LOOPBACK, port).await.unwrap();

    for word in ["ping", "linewire"] {
        client.send(word).await.unwrap();
        assert_eq!(client.receive_line().await.unwrap(), word.to_uppercase());
    }

    client.disconnect().await;
    server.await.unwrap();
}
