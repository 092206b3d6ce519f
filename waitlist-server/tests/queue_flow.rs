//! End-to-end flow: HTTP API (in-process oneshot) + fan-out signals
//!
//! Run: cargo test -p waitlist-server --test queue_flow

use std::time::Duration;

use shared::message::{EventType, SyncPayload};
use shared::models::{QueueEntry, QueueStatus};
use tokio::time::timeout;
use waitlist_server::core::{Config, ServerState};
use waitlist_server::message::transport::Transport;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn test_state() -> (tempfile::TempDir, ServerState) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0, 0);
    let state = ServerState::initialize(&config).await.unwrap();
    state.start_background_tasks();
    (tmp, state)
}

async fn request(
    state: &ServerState,
    method: http::Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (http::StatusCode, serde_json::Value) {
    let builder = http::Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let response = state.http_service().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn join_body(name: &str, phone: &str, party_size: i32) -> serde_json::Value {
    serde_json::json!({
        "customer_name": name,
        "phone_number": phone,
        "party_size": party_size,
    })
}

#[tokio::test]
async fn join_via_api_assigns_position_and_broadcasts() {
    let (_tmp, state) = test_state().await;

    // Subscribe before mutating (a connection open at mutation time)
    let transport = state.message_bus().memory_transport();

    let (status, body) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("Alice", "555-0001", 2)),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);

    let entry: QueueEntry = serde_json::from_value(body).unwrap();
    assert_eq!(entry.position, 1);
    assert_eq!(entry.estimated_wait_time, 15);
    assert_eq!(entry.status, QueueStatus::Waiting);
    assert!(entry.id.starts_with("queue_entry:"));

    // The mutation must have produced a Sync signal
    let msg = timeout(RECV_TIMEOUT, transport.read_message())
        .await
        .expect("no sync signal received")
        .unwrap();
    assert_eq!(msg.event_type, EventType::Sync);
    let payload: SyncPayload = msg.parse_payload().unwrap();
    assert_eq!(payload.resource, "queue_entry");
    assert_eq!(payload.action, "created");
    assert_eq!(payload.version, 1);
    assert_eq!(payload.id, entry.id);
    assert!(payload.data.is_some());
}

#[tokio::test]
async fn every_open_connection_receives_every_mutation_signal() {
    let (_tmp, state) = test_state().await;

    // Three independent subscribers: a raw broadcast receiver, a memory
    // transport and a waitlist-client
    let mut raw_rx = state.message_bus().subscribe();
    let transport = state.message_bus().memory_transport();
    let client = waitlist_client::MessageClient::memory(
        state.message_bus().sender(),
        state.message_bus().sender_to_server(),
    );
    let mut client_rx = client.subscribe();

    // 1. create
    let (_, body) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("Alice", "555-0001", 2)),
    )
    .await;
    let entry: QueueEntry = serde_json::from_value(body).unwrap();

    // 2. update status
    let (status, body) = request(
        &state,
        http::Method::PUT,
        &format!("/api/queue/{}/status", entry.id),
        Some(serde_json::json!({ "status": "NOTIFIED" })),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    let updated: QueueEntry = serde_json::from_value(body).unwrap();
    assert_eq!(updated.status, QueueStatus::Notified);

    // 3. remove
    let (status, body) = request(
        &state,
        http::Method::DELETE,
        &format!("/api/queue/{}", entry.id),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    let removed: Option<QueueEntry> = serde_json::from_value(body).unwrap();
    assert_eq!(removed.unwrap().id, entry.id);

    // Every subscriber sees all three signals, versions strictly increasing
    for (expected_action, expected_version) in
        [("created", 1u64), ("updated", 2), ("deleted", 3)]
    {
        let msg = timeout(RECV_TIMEOUT, raw_rx.recv())
            .await
            .expect("raw receiver missed a sync signal")
            .unwrap();
        let payload: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(payload.action, expected_action);
        assert_eq!(payload.version, expected_version);

        let msg = timeout(RECV_TIMEOUT, transport.read_message())
            .await
            .expect("transport missed a sync signal")
            .unwrap();
        let payload: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(payload.action, expected_action);
        assert_eq!(payload.version, expected_version);

        let msg = timeout(RECV_TIMEOUT, client_rx.recv())
            .await
            .expect("client missed a sync signal")
            .unwrap();
        let payload: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(payload.action, expected_action);
        assert_eq!(payload.version, expected_version);
    }

    // Version counter tracks the number of mutations
    assert_eq!(state.resource_versions.get("queue_entry"), 3);
}

#[tokio::test]
async fn wait_time_and_list_follow_the_scenario() {
    let (_tmp, state) = test_state().await;

    // empty queue: wait time 0
    let (_, body) = request(&state, http::Method::GET, "/api/queue/wait-time", None).await;
    assert_eq!(body, serde_json::json!(0));

    let (_, body) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("Alice", "555-1", 2)),
    )
    .await;
    let alice: QueueEntry = serde_json::from_value(body).unwrap();

    let (_, body) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("Bob", "555-2", 4)),
    )
    .await;
    let bob: QueueEntry = serde_json::from_value(body).unwrap();
    assert_eq!(bob.position, 2);
    assert_eq!(bob.estimated_wait_time, 30);

    // both waiting
    let (_, body) = request(&state, http::Method::GET, "/api/queue/wait-time", None).await;
    assert_eq!(body, serde_json::json!(30));

    // Alice seated → only Bob waiting
    request(
        &state,
        http::Method::PUT,
        &format!("/api/queue/{}/status", alice.id),
        Some(serde_json::json!({ "status": "SEATED" })),
    )
    .await;
    let (_, body) = request(&state, http::Method::GET, "/api/queue/wait-time", None).await;
    assert_eq!(body, serde_json::json!(15));

    // list is ordered by position and contains both entries
    let (_, body) = request(&state, http::Method::GET, "/api/queue", None).await;
    let entries: Vec<QueueEntry> = serde_json::from_value(body).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].customer_name, "Alice");
    assert_eq!(entries[1].customer_name, "Bob");

    // remove both → empty list
    request(
        &state,
        http::Method::DELETE,
        &format!("/api/queue/{}", bob.id),
        None,
    )
    .await;
    request(
        &state,
        http::Method::DELETE,
        &format!("/api/queue/{}", alice.id),
        None,
    )
    .await;
    let (_, body) = request(&state, http::Method::GET, "/api/queue", None).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn not_found_and_invalid_inputs() {
    let (_tmp, state) = test_state().await;

    // unknown (well-formed) id → null, 200
    let (status, body) = request(
        &state,
        http::Method::GET,
        "/api/queue/queue_entry:doesnotexist",
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body, serde_json::Value::Null);

    // malformed id on the read path → swallowed, null (silent degradation)
    let (status, body) = request(&state, http::Method::GET, "/api/queue/garbage", None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body, serde_json::Value::Null);

    // update on unknown id → null, no signal about it
    let (status, body) = request(
        &state,
        http::Method::PUT,
        "/api/queue/queue_entry:doesnotexist/status",
        Some(serde_json::json!({ "status": "SEATED" })),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body, serde_json::Value::Null);

    // remove on unknown id → null
    let (status, body) = request(
        &state,
        http::Method::DELETE,
        "/api/queue/queue_entry:doesnotexist",
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body, serde_json::Value::Null);

    // empty customer name → 400 with a typed validation body
    let (status, body) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("", "555-1", 2)),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // party size below 1 → 400
    let (status, _) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("Alice", "555-1", 0)),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);

    // unknown status string → 400 (rejected by enum deserialization)
    let (_, body) = request(
        &state,
        http::Method::POST,
        "/api/queue",
        Some(join_body("Alice", "555-1", 2)),
    )
    .await;
    let alice: QueueEntry = serde_json::from_value(body).unwrap();
    let (status, _) = request(
        &state,
        http::Method::PUT,
        &format!("/api/queue/{}/status", alice.id),
        Some(serde_json::json!({ "status": "EATING" })),
    )
    .await;
    assert_eq!(status, http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn inbound_client_messages_reach_the_server_channel() {
    let (_tmp, state) = test_state().await;

    let mut inbound = state.message_bus().subscribe_to_clients();

    // Via the server's own memory transport
    let transport = state.message_bus().client_memory_transport();
    let msg = shared::message::BusMessage::new(EventType::Sync, b"ping".to_vec());
    transport.write_message(&msg).await.unwrap();

    let received = timeout(RECV_TIMEOUT, inbound.recv())
        .await
        .expect("inbound message not forwarded")
        .unwrap();
    assert_eq!(received.payload, b"ping".to_vec());

    // And via an in-process waitlist-client
    let client = waitlist_client::MessageClient::memory(
        state.message_bus().sender(),
        state.message_bus().sender_to_server(),
    );
    let msg = shared::message::BusMessage::new(EventType::Sync, b"pong".to_vec());
    client.send(&msg).await.unwrap();

    let received = timeout(RECV_TIMEOUT, inbound.recv())
        .await
        .expect("client message not forwarded")
        .unwrap();
    assert_eq!(received.payload, b"pong".to_vec());
}

#[tokio::test]
async fn health_endpoints_respond() {
    let (_tmp, state) = test_state().await;

    let (status, body) = request(&state, http::Method::GET, "/health", None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = request(&state, http::Method::GET, "/health/detailed", None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["connected_clients"], 0);
}
