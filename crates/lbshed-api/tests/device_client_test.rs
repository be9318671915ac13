// Integration tests for `DeviceClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lbshed_api::{Capability, DeviceClient, Error, FailoverState, SessionState, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "tok-0123456789";

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/mgmt/sessions"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> DeviceClient {
    let base: Url = server.uri().parse().unwrap();
    DeviceClient::connect(
        base,
        "admin",
        &SecretString::from("hunter2"),
        Capability::ALL,
        &TransportConfig::default(),
    )
    .await
    .unwrap()
}

// ── Session establishment ───────────────────────────────────────────

#[tokio::test]
async fn test_connect_sends_capabilities() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/sessions"))
        .and(body_partial_json(json!({
            "capabilities": ["ltm.nodes", "system.failover"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .expect(1)
        .mount(&server)
        .await;

    let base: Url = server.uri().parse().unwrap();
    DeviceClient::connect(
        base,
        "admin",
        &SecretString::from("hunter2"),
        &[Capability::LtmNodes, Capability::SystemFailover],
        &TransportConfig::default(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_connect_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/sessions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let base: Url = server.uri().parse().unwrap();
    let err = DeviceClient::connect(
        base,
        "admin",
        &SecretString::from("wrong"),
        Capability::ALL,
        &TransportConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.is_auth_expired());
}

// ── Partitions ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_active_partition_roundtrip() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/partitions/active"))
        .and(header("X-Session-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Common" })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/mgmt/partitions/active"))
        .and(header("X-Session-Token", TOKEN))
        .and(body_partial_json(json!({ "name": "Tenant-A" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Tenant-A" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;

    assert_eq!(client.active_partition().await.unwrap(), "Common");
    client.set_active_partition("Tenant-A").await.unwrap();
}

#[tokio::test]
async fn test_list_partitions() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/partitions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "name": "Common" }, { "name": "Tenant-A" }]
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let partitions = client.list_partitions().await.unwrap();
    assert_eq!(partitions, vec!["Common", "Tenant-A"]);
}

// ── Route domains ───────────────────────────────────────────────────

#[tokio::test]
async fn test_route_domains() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/net/route-domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 2220, "name": "tenant-a" }, { "id": 0 }]
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let domains = client.route_domains().await.unwrap();
    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0].id, 2220);
    assert_eq!(domains[0].name.as_deref(), Some("tenant-a"));
    assert_eq!(domains[1].id, 0);
}

// ── Node session state ──────────────────────────────────────────────

#[tokio::test]
async fn test_set_session_state_bulk() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/mgmt/ltm/nodes/session-state"))
        .and(body_partial_json(json!({
            "addresses": ["10.0.0.5%2220", "10.0.0.6%2220"],
            "state": "disabled"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "states": ["disabled", "disabled"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let states = client
        .set_session_state(
            &["10.0.0.5%2220".into(), "10.0.0.6%2220".into()],
            SessionState::Disabled,
        )
        .await
        .unwrap();
    assert_eq!(states, vec![SessionState::Disabled, SessionState::Disabled]);
}

#[tokio::test]
async fn test_query_session_state_preserves_order() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/mgmt/ltm/nodes/session-state/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "states": ["enabled", "disabled"]
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let states = client
        .session_state(&["10.0.0.5".into(), "10.0.0.6".into()])
        .await
        .unwrap();
    assert_eq!(states, vec![SessionState::Enabled, SessionState::Disabled]);
}

// ── Failover ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failover_status() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/sys/failover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "standby",
            "peer": "lb2.example.com"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let status = client.failover_status().await.unwrap();
    assert_eq!(status.state, FailoverState::Standby);
    assert!(!status.state.is_active());
    assert_eq!(status.peer.as_deref(), Some("lb2.example.com"));
}

#[tokio::test]
async fn test_unknown_failover_state_tolerated() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/sys/failover"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "state": "maintenance" })),
        )
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let status = client.failover_status().await.unwrap();
    assert_eq!(status.state, FailoverState::Unknown);
}

// ── Fault handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_fault_envelope() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/net/route-domains"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "mgmt.partition.unknown",
            "message": "partition does not exist"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.route_domains().await.unwrap_err();
    match err {
        Error::Api { message, code, status } => {
            assert_eq!(message, "partition does not exist");
            assert_eq!(code.as_deref(), Some("mgmt.partition.unknown"));
            assert_eq!(status, 400);
        }
        other => panic!("expected Api fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stale_token_maps_to_session_expired() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/sys/failover"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.failover_status().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
}

#[tokio::test]
async fn test_garbage_body_reports_deserialization() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/mgmt/partitions/active"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.active_partition().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("nope")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}
