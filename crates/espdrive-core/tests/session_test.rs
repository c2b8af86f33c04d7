#![allow(clippy::unwrap_used)]
// Integration tests for Session: address resolution, command dispatch,
// and the events pipeline against wiremock servers.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use url::Url;
use wiremock::matchers::{any, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use espdrive_core::{
    CommandFilter, CommandKind, CommandOutcome, ConnectionStatus, CoreError, DateRange,
    DeviceAddress, DispatchFailure, EventFilter, FetchFailure, GroupKey, LookupFailure, Session,
    SessionConfig,
};

const DEVICE_ID: &str = "ESP32-ACT01";

// ── Helpers ─────────────────────────────────────────────────────────

fn session_config(backend: &MockServer) -> SessionConfig {
    let lookup_url = Url::parse(&format!("{}/consultar_ip.php", backend.uri())).unwrap();
    let events_url = Url::parse(&format!("{}/listar_eventos.php", backend.uri())).unwrap();
    SessionConfig::new(DEVICE_ID, lookup_url, events_url)
        .with_command_timeout(Duration::from_millis(300))
        .with_lookup_timeout(Duration::from_secs(2))
        .with_events_timeout(Duration::from_secs(2))
}

fn address_of(server: &MockServer) -> DeviceAddress {
    server.address().to_string().parse().unwrap()
}

async fn mount_lookup(backend: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/consultar_ip.php"))
        .and(query_param("dispositivo_id", DEVICE_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(backend)
        .await;
}

/// A connected session whose device is `device`.
async fn connected_session(backend: &MockServer, device: &MockServer) -> Session {
    mount_lookup(
        backend,
        json!({ "success": true, "data": { "ip_local": address_of(device).to_string() } }),
    )
    .await;
    let session = Session::new(session_config(backend)).unwrap();
    session.connect().await.unwrap();
    session
}

async fn assert_lookup_fails(response: ResponseTemplate) -> LookupFailure {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/consultar_ip.php"))
        .respond_with(response)
        .expect(1)
        .mount(&backend)
        .await;

    let session = Session::new(session_config(&backend)).unwrap();
    let failure = session.connect().await.unwrap_err();

    assert_eq!(session.status(), ConnectionStatus::Error);
    assert!(session.address().await.is_none());
    failure
}

// ── Resolution ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_resolves_address() {
    let backend = MockServer::start().await;
    mount_lookup(
        &backend,
        json!({ "success": true, "data": { "ip_local": " 192.168.1.50 " } }),
    )
    .await;

    let session = Session::new(session_config(&backend)).unwrap();
    assert_eq!(session.status(), ConnectionStatus::Connecting);

    let address = session.connect().await.unwrap();

    assert_eq!(address.to_string(), "192.168.1.50");
    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert_eq!(session.address().await, Some(address));
}

#[tokio::test]
async fn test_connect_rejected_by_service() {
    let failure = assert_lookup_fails(ResponseTemplate::new(200).set_body_json(json!({
        "success": false,
        "mensaje": "dispositivo no encontrado"
    })))
    .await;
    assert_eq!(
        failure,
        LookupFailure::Rejected {
            message: Some("dispositivo no encontrado".into())
        }
    );
}

#[tokio::test]
async fn test_connect_missing_ip() {
    let failure = assert_lookup_fails(
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": {} })),
    )
    .await;
    assert_eq!(failure, LookupFailure::MissingAddress);

    let failure = assert_lookup_fails(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "success": true, "data": { "ip_local": "   " } })),
    )
    .await;
    assert_eq!(failure, LookupFailure::MissingAddress);
}

#[tokio::test]
async fn test_connect_unusable_ip() {
    let failure = assert_lookup_fails(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "success": true, "data": { "ip_local": "http://1.2.3.4/x" } })),
    )
    .await;
    assert!(matches!(failure, LookupFailure::InvalidAddress { .. }));
}

#[tokio::test]
async fn test_connect_http_404() {
    let failure = assert_lookup_fails(ResponseTemplate::new(404)).await;
    assert_eq!(failure, LookupFailure::HttpStatus { status: 404 });
}

#[tokio::test]
async fn test_connect_malformed_json() {
    let failure =
        assert_lookup_fails(ResponseTemplate::new(200).set_body_string("<b>Warning</b>: mysqli"))
            .await;
    assert_eq!(failure, LookupFailure::MalformedBody);
}

#[tokio::test]
async fn test_reconnect_failure_moves_connected_to_error() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/consultar_ip.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "ip_local": "10.0.0.9" }
        })))
        .up_to_n_times(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/consultar_ip.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;

    let session = Session::new(session_config(&backend)).unwrap();
    let mut status_rx = session.subscribe_status();

    session.connect().await.unwrap();
    assert_eq!(*status_rx.borrow_and_update(), ConnectionStatus::Connected);

    let failure = session.connect().await.unwrap_err();
    assert_eq!(failure, LookupFailure::HttpStatus { status: 500 });
    assert!(status_rx.has_changed().unwrap());
    assert_eq!(*status_rx.borrow_and_update(), ConnectionStatus::Error);
    assert!(session.address().await.is_none());
}

#[tokio::test]
async fn test_address_override_skips_lookup() {
    let backend = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let fixed: DeviceAddress = "192.168.4.1".parse().unwrap();
    let session =
        Session::new(session_config(&backend).with_address_override(fixed.clone())).unwrap();

    assert_eq!(session.connect().await.unwrap(), fixed);
    assert_eq!(session.status(), ConnectionStatus::Connected);
}

// ── Dispatch ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_posts_token_as_plain_text() {
    let backend = MockServer::start().await;
    let device = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/comando"))
        .and(header("content-type", "text/plain"))
        .and(body_string("adelante"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&device)
        .await;

    let session = connected_session(&backend, &device).await;
    let outcome = session.send(CommandKind::Forward).await;

    assert_eq!(outcome, CommandOutcome::sent("OK"));
}

#[tokio::test]
async fn test_send_sequence_in_order() {
    let backend = MockServer::start().await;
    let device = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/comando"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&device)
        .await;

    let session = connected_session(&backend, &device).await;
    for command in [CommandKind::Left, CommandKind::Right, CommandKind::Stop] {
        assert!(session.send(command).await.is_sent());
    }

    let bodies: Vec<String> = device
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect();
    assert_eq!(bodies, ["izquierda", "derecha", "stop"]);
}

#[tokio::test]
async fn test_send_times_out() {
    let backend = MockServer::start().await;
    let device = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&device)
        .await;

    let session = connected_session(&backend, &device).await;
    let outcome = session.send(CommandKind::Stop).await;

    assert_eq!(outcome.failure(), Some(DispatchFailure::Timeout));
}

#[tokio::test]
async fn test_send_http_error_status() {
    let backend = MockServer::start().await;
    let device = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&device)
        .await;

    let session = connected_session(&backend, &device).await;
    let outcome = session.send(CommandKind::Backward).await;

    assert_eq!(outcome, CommandOutcome::failed(DispatchFailure::HttpStatus(500)));
}

#[tokio::test]
async fn test_send_without_address_makes_no_request() {
    let backend = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let session = Session::new(session_config(&backend)).unwrap();
    let outcome = session.send(CommandKind::Forward).await;

    assert_eq!(outcome, CommandOutcome::failed(DispatchFailure::Unknown));
}

#[tokio::test]
async fn test_send_to_closed_port_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let backend = MockServer::start().await;
    let closed: DeviceAddress = format!("127.0.0.1:{port}").parse().unwrap();

    let session = Session::new(session_config(&backend).with_address_override(closed)).unwrap();
    session.connect().await.unwrap();
    let outcome = session.send(CommandKind::Stop).await;

    assert_eq!(outcome.failure(), Some(DispatchFailure::NetworkError));
}

// ── Events ──────────────────────────────────────────────────────────

async fn mount_events(backend: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/listar_eventos.php"))
        .and(header("accept", "application/json"))
        .respond_with(response)
        .mount(backend)
        .await;
}

fn recent_events() -> serde_json::Value {
    let now = Utc::now();
    let ago = |hours: i64| (now - chrono::TimeDelta::hours(hours)).to_rfc3339();
    json!([
        { "id": 1, "posicion": "adelante", "timestamp": ago(0) },
        { "id": 2, "posicion": "stop", "timestamp": ago(0) },
        { "id": 3, "posicion": "adelante", "timestamp": ago(24 * 12) },
        { "id": 4, "posicion": "Adelante", "timestamp": "garbage" },
    ])
}

#[tokio::test]
async fn test_fetch_events_eventos_shape() {
    let backend = MockServer::start().await;
    mount_events(
        &backend,
        ResponseTemplate::new(200).set_body_json(json!({ "eventos": recent_events() })),
    )
    .await;

    let session = Session::new(session_config(&backend)).unwrap();
    let records = session.fetch_events().await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "4"]);
    assert_eq!(records[3].kind, Some(CommandKind::Forward));
    assert!(records[3].timestamp.is_none());
}

#[tokio::test]
async fn test_fetch_events_malformed_body_is_empty() {
    let backend = MockServer::start().await;
    mount_events(&backend, ResponseTemplate::new(200).set_body_string("not json")).await;

    let session = Session::new(session_config(&backend)).unwrap();
    assert!(session.fetch_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_events_transport_failures() {
    for (status, expected) in [
        (404, FetchFailure::NotFound),
        (503, FetchFailure::Server(503)),
        (403, FetchFailure::HttpStatus(403)),
    ] {
        let backend = MockServer::start().await;
        mount_events(&backend, ResponseTemplate::new(status)).await;

        let session = Session::new(session_config(&backend)).unwrap();
        let err = session.fetch_events().await.unwrap_err();
        assert!(
            matches!(err, CoreError::EventsUnavailable { reason } if reason == expected),
            "{status}: {err}"
        );
    }
}

#[tokio::test]
async fn test_history_filters_then_groups() {
    let backend = MockServer::start().await;
    mount_events(
        &backend,
        ResponseTemplate::new(200).set_body_json(json!({ "data": recent_events() })),
    )
    .await;
    let session = Session::new(session_config(&backend)).unwrap();

    let everything = session.history(&EventFilter::default()).await.unwrap();
    let total: usize = everything.iter().map(|g| g.len()).sum();
    assert_eq!(total, 4);
    assert_eq!(everything.last().map(|g| g.key), Some(GroupKey::UnknownDate));

    let forward_this_week = EventFilter::new(
        CommandFilter::Only(CommandKind::Forward),
        DateRange::LastWeek,
    );
    let groups = session.history(&forward_this_week).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "Today");
    let ids: Vec<&str> = groups[0].records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
}
