#![allow(clippy::unwrap_used)]
// Integration tests for the lookup, device, and events clients using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use espdrive_api::{DeviceClient, Error, EventsClient, LookupClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn lookup_setup() -> (MockServer, LookupClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("{}/consultar_ip.php", server.uri())).unwrap();
    let client = LookupClient::new(url, &TransportConfig::default()).unwrap();
    (server, client)
}

fn command_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/comando", server.uri())).unwrap()
}

// ── Lookup tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_lookup_success() {
    let (server, client) = lookup_setup().await;

    Mock::given(method("GET"))
        .and(path("/consultar_ip.php"))
        .and(query_param("dispositivo_id", "ESP32-ACT01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "ip_local": "192.168.1.50" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.lookup("ESP32-ACT01").await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.ip_local(), Some("192.168.1.50"));
}

#[tokio::test]
async fn test_lookup_success_flag_as_number() {
    let (server, client) = lookup_setup().await;

    Mock::given(method("GET"))
        .and(path("/consultar_ip.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": 1,
            "data": { "ip_local": "10.0.0.7" }
        })))
        .mount(&server)
        .await;

    let resp = client.lookup("ESP32-ACT01").await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.ip_local(), Some("10.0.0.7"));
}

#[tokio::test]
async fn test_lookup_missing_data() {
    let (server, client) = lookup_setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "mensaje": "no encontrado" })),
        )
        .mount(&server)
        .await;

    let resp = client.lookup("ESP32-ACT01").await.unwrap();

    assert!(!resp.success);
    assert_eq!(resp.ip_local(), None);
    assert_eq!(resp.message.as_deref(), Some("no encontrado"));
}

#[tokio::test]
async fn test_lookup_malformed_body() {
    let (server, client) = lookup_setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.lookup("ESP32-ACT01").await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_lookup_not_found() {
    let (server, client) = lookup_setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = client.lookup("ESP32-ACT01").await.unwrap_err();

    assert!(err.is_not_found(), "expected 404, got: {err:?}");
    assert_eq!(err.status(), Some(404));
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_command_sends_plain_text_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/comando"))
        .and(header("content-type", "text/plain"))
        .and(body_string("izquierda"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK izquierda"))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeviceClient::new(&TransportConfig::default()).unwrap();
    let body = client
        .post_command(command_url(&server), "izquierda")
        .await
        .unwrap();

    assert_eq!(body, "OK izquierda");
}

#[tokio::test]
async fn test_post_command_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("comando invalido"))
        .mount(&server)
        .await;

    let client = DeviceClient::new(&TransportConfig::default()).unwrap();
    let err = client
        .post_command(command_url(&server), "stop")
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, ref body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "comando invalido");
        }
        other => panic!("expected HttpStatus error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_post_command_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig::with_timeout(Duration::from_millis(100));
    let client = DeviceClient::new(&transport).unwrap();
    let err = client
        .post_command(command_url(&server), "adelante")
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
    assert!(matches!(err, Error::Timeout { timeout_ms: 100 }));
}

// ── Events tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_events_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listar_eventos.php"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eventos": [{ "id": 1, "posicion": "adelante", "timestamp": "2025-06-11 10:00:00" }]
        })))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/listar_eventos.php", server.uri())).unwrap();
    let client = EventsClient::new(url, &TransportConfig::default()).unwrap();
    let value = client.fetch_json().await.unwrap();

    assert_eq!(value["eventos"][0]["posicion"], "adelante");
}

#[tokio::test]
async fn test_fetch_events_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/listar_eventos.php", server.uri())).unwrap();
    let client = EventsClient::new(url, &TransportConfig::default()).unwrap();
    let err = client.fetch_raw().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
}
