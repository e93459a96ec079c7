//! Integration tests for the Sixletters server, handler, and listeners.
//!
//! Every test runs a real server on OS-assigned ports and drives it with
//! `tokio-tungstenite` clients and raw `TcpStream`s.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use sixletters::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const WAIT: Duration = Duration::from_secs(5);

struct TestServer {
    addr: SocketAddr,
    admin: SocketAddr,
    health: SocketAddr,
    task: JoinHandle<Result<(), SixlettersError>>,
}

async fn start_server_with(config: HubConfig) -> TestServer {
    let server = SixlettersServer::builder()
        .bind("127.0.0.1:0")
        .admin_addr("127.0.0.1:0")
        .health_addr("127.0.0.1:0")
        .hub_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr");
    let admin = server.admin_local_addr().expect("admin enabled");
    let health = server.health_local_addr().expect("health enabled");
    let task = tokio::spawn(server.run());

    TestServer {
        addr,
        admin,
        health,
        task,
    }
}

async fn start_server() -> TestServer {
    start_server_with(HubConfig::default()).await
}

async fn connect(addr: SocketAddr, path: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, text: &str) {
    ws.send(Message::Text(text.into())).await.expect("send");
}

/// Next text frame, skipping control frames.
async fn recv(ws: &mut ClientWs) -> String {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("recv");
        match msg {
            Message::Text(text) => return text.as_str().to_owned(),
            Message::Close(_) => panic!("connection closed"),
            _ => continue,
        }
    }
}

/// Waits for the server to close the connection.
async fn expect_closed(ws: &mut ClientWs) {
    loop {
        match tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for close")
        {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(Message::Text(text))) => panic!("unexpected line {text:?}"),
            Some(Ok(_)) => continue,
        }
    }
}

/// Hosts a round as `alice` with `cat dog_` and returns the host socket
/// and the round code.
async fn host_alice(addr: SocketAddr) -> (ClientWs, String) {
    let mut host = connect(addr, "/sixletters/ws/hostcoop/alice").await;
    send(&mut host, "cat dog_").await;
    let code = recv(&mut host).await;
    (host, code)
}

async fn join_as(addr: SocketAddr, code: &str, name: &str) -> ClientWs {
    let mut ws = connect(addr, &format!("/sixletters/ws/join/c{code}")).await;
    assert_eq!(recv(&mut ws).await, ":ok");
    send(&mut ws, name).await;
    ws
}

async fn admin_request(admin: SocketAddr, commands: &str) -> Vec<String> {
    let stream = TcpStream::connect(admin).await.expect("admin connect");
    let (read, mut write) = stream.into_split();
    write.write_all(commands.as_bytes()).await.expect("admin write");
    write.shutdown().await.expect("admin shutdown");

    let mut lines = BufReader::new(read).lines();
    let mut out = Vec::new();
    while let Some(line) = tokio::time::timeout(WAIT, lines.next_line())
        .await
        .expect("admin timed out")
        .expect("admin read")
    {
        out.push(line);
    }
    out
}

async fn health_probe(health: SocketAddr) -> String {
    let mut stream = TcpStream::connect(health).await.expect("health connect");
    let mut out = String::new();
    tokio::time::timeout(WAIT, stream.read_to_string(&mut out))
        .await
        .expect("health timed out")
        .expect("health read");
    out
}

// =========================================================================
// Hosting and joining
// =========================================================================

#[tokio::test]
async fn test_host_receives_code() {
    let server = start_server().await;
    let (_host, code) = host_alice(server.addr).await;

    assert_eq!(code.len(), 5);
    assert!(code.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
}

#[tokio::test]
async fn test_join_catch_up_and_attempt_broadcast() {
    let server = start_server().await;
    let (mut alice, code) = host_alice(server.addr).await;

    let mut bob = join_as(server.addr, &code, "bob").await;
    assert_eq!(recv(&mut bob).await, "alice bob");
    assert_eq!(recv(&mut bob).await, "cat dog");
    assert_eq!(recv(&mut bob).await, ":attempt dog alice");
    assert_eq!(recv(&mut alice).await, ":join bob");

    send(&mut bob, ":attempt cat").await;
    assert_eq!(recv(&mut alice).await, ":attempt cat bob");

    // Bob's own guess is not echoed back; his next line is alice's.
    send(&mut alice, ":giveup").await;
    assert_eq!(recv(&mut bob).await, ":giveup alice");
}

#[tokio::test]
async fn test_silent_peer_does_not_block_other_connections() {
    let server = start_server().await;
    let _silent = TcpStream::connect(server.addr).await.expect("tcp connect");

    let (_host, code) = tokio::time::timeout(
        Duration::from_secs(1),
        host_alice(server.addr),
    )
    .await
    .expect("host should not wait behind a silent peer");
    assert_eq!(code.len(), 5);
}

#[tokio::test]
async fn test_unknown_code_gets_noexist() {
    let server = start_server().await;
    let mut ws = connect(server.addr, "/sixletters/ws/join/czzzzz").await;

    assert_eq!(recv(&mut ws).await, ":noexist");
    expect_closed(&mut ws).await;
}

#[tokio::test]
async fn test_name_negotiation() {
    let server = start_server().await;
    let (_alice, code) = host_alice(server.addr).await;

    let mut ws = join_as(server.addr, &code, "bob smith").await;
    assert_eq!(recv(&mut ws).await, ":badname");

    send(&mut ws, "alice").await;
    assert_eq!(recv(&mut ws).await, ":taken");

    send(&mut ws, "bob").await;
    assert_eq!(recv(&mut ws).await, "alice bob");
}

#[tokio::test]
async fn test_disconnect_is_a_quit() {
    let server = start_server().await;
    let (mut alice, code) = host_alice(server.addr).await;
    let mut bob = join_as(server.addr, &code, "bob").await;
    assert_eq!(recv(&mut bob).await, "alice bob");
    assert_eq!(recv(&mut alice).await, ":join bob");

    bob.close(None).await.expect("close");

    assert_eq!(recv(&mut alice).await, ":quit bob");
}

#[tokio::test]
async fn test_sole_player_giving_up_reveals() {
    let server = start_server().await;
    let (mut alice, code) = host_alice(server.addr).await;

    send(&mut alice, ":giveup").await;
    assert_eq!(recv(&mut alice).await, ":allgiveup");

    let mut bob = join_as(server.addr, &code, "bob").await;
    assert_eq!(recv(&mut bob).await, "alice bob");
    assert_eq!(recv(&mut bob).await, "cat dog");
    assert_eq!(recv(&mut bob).await, ":attempt cat _");
    assert_eq!(recv(&mut bob).await, ":attempt dog alice");
    assert_eq!(recv(&mut bob).await, ":giveup alice");
}

#[tokio::test]
async fn test_malformed_word_list_drops_connection() {
    let server = start_server().await;
    let mut host = connect(server.addr, "/sixletters/ws/hostcoop/alice").await;
    send(&mut host, "cat Dog").await;

    expect_closed(&mut host).await;
}

#[tokio::test]
async fn test_unknown_route_is_closed() {
    let server = start_server().await;
    let mut ws = connect(server.addr, "/sixletters/ws/lobby").await;

    expect_closed(&mut ws).await;
}

// =========================================================================
// Admin and health listeners
// =========================================================================

#[tokio::test]
async fn test_admin_snapshots() {
    let server = start_server().await;
    assert_eq!(admin_request(server.admin, "snapshots\n").await, vec!["0"]);

    let (_alice, code) = host_alice(server.addr).await;
    let lines = admin_request(server.admin, "snapshots\r\nbogus\n").await;

    assert_eq!(lines, vec!["1".to_string(), format!("1 {code} alice")]);
}

#[tokio::test]
async fn test_health_reports_drain_after_phase_out() {
    let server = start_server().await;
    let (_alice, _code) = host_alice(server.addr).await;
    assert_eq!(health_probe(server.health).await, "");

    // `snapshots` only answers once the hub has handled `phaseout`.
    admin_request(server.admin, "phaseout\nsnapshots\n").await;

    assert_eq!(health_probe(server.health).await, "drain\n");
    assert!(!server.task.is_finished(), "a round is still registered");
}

#[tokio::test]
async fn test_phase_out_without_rounds_stops_server() {
    let server = start_server().await;

    admin_request(server.admin, "phaseout\n").await;

    let result = tokio::time::timeout(WAIT, server.task)
        .await
        .expect("server should stop")
        .expect("server task should not panic");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_server_stops_once_last_round_expires() {
    let server = start_server_with(HubConfig {
        idle_timeout: Duration::from_millis(50),
        ..HubConfig::default()
    })
    .await;

    let (mut alice, _code) = host_alice(server.addr).await;
    alice.close(None).await.expect("close");

    let result = tokio::time::timeout(WAIT, server.task)
        .await
        .expect("server should stop")
        .expect("server task should not panic");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_build_rejects_bad_prefix() {
    let result = SixlettersServer::builder()
        .bind("127.0.0.1:0")
        .hub_config(HubConfig {
            prefix: "EU".into(),
            ..HubConfig::default()
        })
        .build()
        .await;

    assert!(matches!(result, Err(SixlettersError::Config(_))));
}
