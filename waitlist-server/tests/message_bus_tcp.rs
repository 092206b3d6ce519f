//! Message bus over real TCP: handshake, fan-out delivery, disconnect cleanup
//!
//! Run: cargo test -p waitlist-server --test message_bus_tcp

use std::time::Duration;

use shared::message::{BusMessage, EventType, HandshakePayload, SyncPayload};
use tokio::time::{sleep, timeout};
use waitlist_client::MessageClient;
use waitlist_client::message::transport::{TcpTransport, Transport};
use waitlist_server::core::{Config, ServerState};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Start a full server state with the TCP bus on a random port.
async fn tcp_state() -> (tempfile::TempDir, ServerState, String) {
    let tmp = tempfile::tempdir().unwrap();
    // Random port to avoid conflicts between parallel tests
    let port = 10000 + (rand::random::<u16>() % 20000);
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0, port);
    let state = ServerState::initialize(&config).await.unwrap();
    state.start_background_tasks();

    let bus_service = state.message_bus.clone();
    tokio::spawn(async move {
        if let Err(e) = bus_service.start_tcp_server().await {
            eprintln!("TCP server failed: {}", e);
        }
    });

    let addr = format!("127.0.0.1:{}", port);
    wait_for_listener(&addr).await;
    (tmp, state, addr)
}

/// Poll until the listener accepts connections (bind is asynchronous).
async fn wait_for_listener(addr: &str) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("TCP server did not come up on {}", addr);
}

#[tokio::test]
async fn tcp_client_receives_broadcasts() {
    let (_tmp, state, addr) = tcp_state().await;

    let client = MessageClient::connect(&addr, "tcp-test-client")
        .await
        .unwrap();
    assert!(client.client_id().is_some());
    let mut rx = client.subscribe();

    // Registry contains the connection
    sleep(Duration::from_millis(50)).await;
    let connected = state.message_bus().get_connected_clients();
    assert_eq!(connected.len(), 1);

    // Broadcast a sync signal and receive it over the wire
    state
        .broadcast_sync(
            "queue_entry",
            "created",
            "queue_entry:abc",
            Some(&serde_json::json!({ "position": 1 })),
        )
        .await;

    let msg = timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("no sync over TCP")
        .unwrap();
    assert_eq!(msg.event_type, EventType::Sync);
    let payload: SyncPayload = msg.parse_payload().unwrap();
    assert_eq!(payload.resource, "queue_entry");
    assert_eq!(payload.id, "queue_entry:abc");
    assert_eq!(payload.version, 1);

    client.close().await.unwrap();
}

#[tokio::test]
async fn disconnect_removes_client_from_registry() {
    let (_tmp, state, addr) = tcp_state().await;

    let client = MessageClient::connect(&addr, "short-lived").await.unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(state.message_bus().get_connected_clients().len(), 1);

    client.close().await.unwrap();

    // The read loop notices the disconnect and cleans up the registry
    for _ in 0..50 {
        if state.message_bus().get_connected_clients().is_empty() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("client was not removed from the registry after disconnect");
}

#[tokio::test]
async fn protocol_version_mismatch_is_rejected() {
    let (_tmp, _state, addr) = tcp_state().await;

    // Hand-rolled handshake with a bad version
    let transport = TcpTransport::connect(&addr).await.unwrap();
    let handshake = BusMessage::handshake(&HandshakePayload {
        version: 99,
        client_name: Some("old-client".to_string()),
        client_version: Some("0.0.1".to_string()),
        client_id: None,
    });
    transport.write_message(&handshake).await.unwrap();

    let response = timeout(RECV_TIMEOUT, transport.read_message())
        .await
        .expect("no handshake response")
        .unwrap();
    assert_eq!(response.event_type, EventType::Response);
    assert_eq!(response.correlation_id, Some(handshake.request_id));
    let payload: shared::message::ResponsePayload = response.parse_payload().unwrap();
    assert!(!payload.success);
    assert!(payload.message.contains("version mismatch"));
}

#[tokio::test]
async fn shutdown_stops_the_tcp_server() {
    let (_tmp, state, addr) = tcp_state().await;

    let _client = MessageClient::connect(&addr, "witness").await.unwrap();
    state.message_bus().shutdown();

    // After shutdown, new connections are not accepted: either the TCP
    // connect is refused or the handshake never gets a reply
    sleep(Duration::from_millis(100)).await;
    let result = timeout(RECV_TIMEOUT, MessageClient::connect(&addr, "too-late")).await;
    assert!(matches!(result, Err(_) | Ok(Err(_))));
}
