//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and drive it with
//! a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use sixletters_transport::{
        Connection, Incoming, OriginPolicy, Transport, TransportError,
        WebSocketConnection, WebSocketTransport,
    };
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn bind(policy: OriginPolicy) -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind")
            .with_origin_policy(policy);
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    async fn accept(transport: &mut WebSocketTransport) -> WebSocketConnection {
        let incoming = transport.accept().await.expect("should accept");
        incoming.upgrade().await.expect("should upgrade")
    }

    async fn connect_client(addr: &str, path: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_accept_captures_path_and_exchanges_text() {
        let (mut transport, addr) = bind(OriginPolicy::SameHost).await;

        let server = tokio::spawn(async move { accept(&mut transport).await });
        let mut client = connect_client(&addr, "/sixletters/ws/join/cab12c").await;
        let conn = server.await.expect("task should complete");

        assert_eq!(conn.path(), "/sixletters/ws/join/cab12c");

        client
            .send(Message::Text("hello".into()))
            .await
            .expect("client send");
        let received = conn.recv().await.expect("recv").expect("some");
        assert_eq!(received, "hello");

        conn.send(":ok").await.expect("server send");
        let reply = client.next().await.expect("frame").expect("ok");
        assert_eq!(reply.into_text().expect("text").as_str(), ":ok");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_close() {
        let (mut transport, addr) = bind(OriginPolicy::SameHost).await;

        let server = tokio::spawn(async move { accept(&mut transport).await });
        let mut client = connect_client(&addr, "/").await;
        let conn = server.await.expect("task should complete");

        client.close(None).await.expect("close");
        let received = conn.recv().await.expect("recv");
        assert!(received.is_none());
    }

    #[tokio::test]
    async fn test_binary_frame_is_an_error() {
        let (mut transport, addr) = bind(OriginPolicy::SameHost).await;

        let server = tokio::spawn(async move { accept(&mut transport).await });
        let mut client = connect_client(&addr, "/").await;
        let conn = server.await.expect("task should complete");

        client
            .send(Message::Binary(vec![1, 2, 3].into()))
            .await
            .expect("client send");
        let result = conn.recv().await;
        assert!(matches!(result, Err(TransportError::UnexpectedFrame(_))));
    }

    #[tokio::test]
    async fn test_foreign_origin_is_rejected() {
        let (mut transport, addr) = bind(OriginPolicy::SameHost).await;

        let server = tokio::spawn(async move {
            let incoming = transport.accept().await.expect("should accept");
            incoming.upgrade().await
        });

        let mut request = format!("ws://{addr}/")
            .into_client_request()
            .expect("request");
        request
            .headers_mut()
            .insert("Origin", "https://evil.test".parse().expect("header"));
        let result = tokio_tungstenite::connect_async(request).await;
        assert!(result.is_err(), "upgrade should be refused");

        let accepted = server.await.expect("task should complete");
        assert!(matches!(accepted, Err(TransportError::UpgradeFailed(_))));
    }

    #[tokio::test]
    async fn test_any_policy_accepts_foreign_origin() {
        let (mut transport, addr) = bind(OriginPolicy::Any).await;

        let server = tokio::spawn(async move {
            let incoming = transport.accept().await.expect("should accept");
            incoming.upgrade().await
        });

        let mut request = format!("ws://{addr}/")
            .into_client_request()
            .expect("request");
        request
            .headers_mut()
            .insert("Origin", "https://evil.test".parse().expect("header"));
        let result = tokio_tungstenite::connect_async(request).await;
        assert!(result.is_ok());
        assert!(server.await.expect("task").is_ok());
    }

    #[tokio::test]
    async fn test_accept_does_not_wait_for_handshake() {
        let (mut transport, addr) = bind(OriginPolicy::SameHost).await;

        let _silent = TcpStream::connect(&addr).await.expect("tcp connect");
        let incoming = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            transport.accept(),
        )
        .await
        .expect("accept should not wait for the upgrade request")
        .expect("should accept");

        assert_eq!(
            incoming.peer_addr().ip(),
            std::net::Ipv4Addr::LOCALHOST
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_times_out_upgrade() {
        let (mut transport, addr) = bind(OriginPolicy::SameHost).await;

        let _silent = TcpStream::connect(&addr).await.expect("tcp connect");
        let incoming = transport.accept().await.expect("should accept");

        let result = incoming.upgrade().await;
        assert!(matches!(result, Err(TransportError::UpgradeFailed(_))));
    }
}
