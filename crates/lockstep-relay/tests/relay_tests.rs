//! End-to-end relay tests
//!
//! Full-stack tests over real WebSocket connections: join/drop tracking,
//! single-target sync replies, verbatim fan-out, and bad-input handling.

use lockstep_test_utils::{wait_for_session_count, TestRelay};
use serde_json::json;
use std::time::Duration;

const RECV_WAIT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(400);

#[tokio::test]
async fn test_join_and_drop_update_session_count() {
    let relay = TestRelay::start().await;
    assert_eq!(relay.relay().session_count(), 0);

    let a = relay.connect_client().await;
    let b = relay.connect_client().await;
    assert!(
        wait_for_session_count(relay.relay(), 2, RECV_WAIT).await,
        "both clients should be registered"
    );

    b.close().await;
    assert!(
        wait_for_session_count(relay.relay(), 1, RECV_WAIT).await,
        "closed client should be removed"
    );

    a.close().await;
    assert!(wait_for_session_count(relay.relay(), 0, RECV_WAIT).await);
}

#[tokio::test]
async fn test_ready_yields_exactly_one_sync() {
    let relay = TestRelay::start().await;
    let a = relay.connect_client().await;
    let mut b = relay.connect_client().await;
    let mut c = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 3, RECV_WAIT).await);

    a.send_json(&json!({"type":"ready","hash":"h1","currentTime":12.5,"paused":false}))
        .await;

    let expected = json!({"type":"sync","hash":"h1","currentTime":12.5,"paused":false});
    let got_b = b.recv_json(RECV_WAIT).await;
    let got_c = c.recv_json(SILENCE_WINDOW).await;

    let mut receivers = 0;
    for got in [&got_b, &got_c].into_iter().flatten() {
        assert_eq!(got, &expected);
        receivers += 1;
    }
    assert_eq!(receivers, 1, "exactly one of the peers answers the ready");
}

#[tokio::test]
async fn test_ready_with_no_peers_is_silent() {
    let relay = TestRelay::start().await;
    let mut a = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 1, RECV_WAIT).await);

    a.send_json(&json!({"type":"ready","hash":"h1","currentTime":0.0,"paused":true}))
        .await;

    assert!(a.is_silent(SILENCE_WINDOW).await);
    assert_eq!(relay.relay().session_count(), 1);
}

#[tokio::test]
async fn test_generic_broadcast_reaches_all_other_clients() {
    let relay = TestRelay::start().await;
    let mut a = relay.connect_client().await;
    let mut b = relay.connect_client().await;
    let mut c = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 3, RECV_WAIT).await);

    let payload = json!({"type":"seek","position":42});
    b.send_json(&payload).await;

    assert_eq!(a.recv_json(RECV_WAIT).await.as_ref(), Some(&payload));
    assert_eq!(c.recv_json(RECV_WAIT).await.as_ref(), Some(&payload));
    assert!(b.is_silent(SILENCE_WINDOW).await, "sender hears nothing back");
}

#[tokio::test]
async fn test_generic_fields_survive_the_relay_verbatim() {
    let relay = TestRelay::start().await;
    let a = relay.connect_client().await;
    let mut b = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 2, RECV_WAIT).await);

    let payload = json!({
        "type": "chat",
        "user": "ana",
        "body": "ready when you are",
        "meta": {"ts": 1712345678, "tags": ["a", "b"]}
    });
    a.send_json(&payload).await;

    assert_eq!(b.recv_json(RECV_WAIT).await.as_ref(), Some(&payload));
}

#[tokio::test]
async fn test_disconnected_peer_is_not_a_target() {
    let relay = TestRelay::start().await;
    let mut a = relay.connect_client().await;
    let b = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 2, RECV_WAIT).await);

    b.close().await;
    assert!(wait_for_session_count(relay.relay(), 1, RECV_WAIT).await);

    // Nothing to deliver to and nothing comes back; the relay stays up
    a.send_json(&json!({"type":"seek","position":7})).await;
    assert!(a.is_silent(SILENCE_WINDOW).await);

    // A new peer proves routing still works after the drop
    let mut c = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 2, RECV_WAIT).await);
    let payload = json!({"type":"seek","position":8});
    a.send_json(&payload).await;
    assert_eq!(c.recv_json(RECV_WAIT).await.as_ref(), Some(&payload));
}

#[tokio::test]
async fn test_malformed_input_is_dropped_without_side_effects() {
    let relay = TestRelay::start().await;
    let a = relay.connect_client().await;
    let mut b = relay.connect_client().await;
    assert!(wait_for_session_count(relay.relay(), 2, RECV_WAIT).await);

    a.send_raw(b"this is not json").await;
    assert!(b.is_silent(SILENCE_WINDOW).await);
    assert_eq!(relay.relay().session_count(), 2);

    // The offending connection keeps working afterwards
    let payload = json!({"type":"play"});
    a.send_json(&payload).await;
    assert_eq!(b.recv_json(RECV_WAIT).await.as_ref(), Some(&payload));
}

#[tokio::test]
async fn test_rapid_connect_disconnect() {
    let relay = TestRelay::start().await;

    for _ in 0..10 {
        let client = relay.connect_client().await;
        assert!(client.is_connected());
        client.close().await;
    }

    assert!(
        wait_for_session_count(relay.relay(), 0, RECV_WAIT).await,
        "all sessions cleaned up after churn"
    );
    assert!(relay.relay().registry().is_empty());
}
