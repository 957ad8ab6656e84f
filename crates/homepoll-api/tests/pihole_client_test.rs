#![allow(clippy::unwrap_used)]
// Integration tests for `PiHoleClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homepoll_api::{
    DeviceEndpoint, Error, ErrorKind, PiHoleClient, SummaryFormat, TlsMode, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const API: &str = "/admin/api.php";

async fn setup(token: Option<&str>) -> (MockServer, PiHoleClient) {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), token, Duration::from_secs(5));
    (server, client)
}

fn client_for(base: &str, token: Option<&str>, timeout: Duration) -> PiHoleClient {
    let transport = TransportConfig {
        tls: TlsMode::System,
        timeout,
    };
    let endpoint = DeviceEndpoint::new(base, timeout).unwrap();
    PiHoleClient::with_client(
        transport.build_client().unwrap(),
        endpoint,
        token.map(|t| SecretString::from(t.to_owned())),
    )
}

fn formatted_summary() -> serde_json::Value {
    json!({
        "domains_being_blocked": "121,860",
        "dns_queries_today": "12,345",
        "ads_blocked_today": "1,024",
        "ads_percentage_today": "8.3",
        "unique_domains": "2,001",
        "queries_forwarded": "7,000",
        "queries_cached": "4,321",
        "clients_ever_seen": "14",
        "unique_clients": "12",
        "privacy_level": "0",
        "status": "enabled"
    })
}

fn raw_summary() -> serde_json::Value {
    json!({
        "domains_being_blocked": 121_860,
        "dns_queries_today": 12_345,
        "ads_blocked_today": 1_024,
        "ads_percentage_today": 8.294_9,
        "unique_domains": 2_001,
        "queries_forwarded": 7_000,
        "queries_cached": 4_321,
        "clients_ever_seen": 14,
        "unique_clients": 12,
        "privacy_level": 0,
        "status": "disabled",
        "gravity_last_updated": { "file_exists": true, "absolute": 1_700_000_000 }
    })
}

// ── Summary ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_summary_strips_grouping_separators() {
    let (server, client) = setup(None).await;
    let client = client.with_summary_format(SummaryFormat::Formatted);

    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("summary", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(formatted_summary()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client.fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.get("status"), Some("enabled"));
    assert_eq!(snapshot.get("dns_queries_today"), Some("12345"));
    assert_eq!(snapshot.get("domains_being_blocked"), Some("121860"));
    assert_eq!(snapshot.len(), 11);
}

#[tokio::test]
async fn test_summary_raw_is_default() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("summaryRaw", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(raw_summary()))
        .expect(1)
        .mount(&server)
        .await;

    let summary = client.fetch_summary().await.unwrap();

    assert_eq!(summary.status, "disabled");
    assert_eq!(summary.is_enabled(), Some(false));
    assert_eq!(summary.dns_queries_today, "12345");
    assert_eq!(summary.ads_percentage_today, "8.2949");
}

#[tokio::test]
async fn test_summary_missing_field_is_parse_error() {
    let (server, client) = setup(None).await;

    let mut body = raw_summary();
    body.as_object_mut().unwrap().remove("unique_clients");

    Mock::given(method("GET"))
        .and(path(API))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client.fetch_summary().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    match err {
        Error::Deserialization { ref message, .. } => {
            assert!(message.contains("unique_clients"), "got: {message}");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_summary_http_error() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path(API))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.fetch_summary().await.unwrap_err();

    assert!(
        matches!(err, Error::HttpStatus { status: 500, .. }),
        "expected HttpStatus error, got: {err:?}"
    );
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_summary_timeout() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), None, Duration::from_millis(200));

    Mock::given(method("GET"))
        .and(path(API))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(raw_summary())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.fetch_summary().await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

// ── Connectivity ────────────────────────────────────────────────────

#[tokio::test]
async fn test_connectivity_ok() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    assert!(client.check_connectivity().await);
}

#[tokio::test]
async fn test_connectivity_server_error_is_false() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client.check_connectivity().await);
}

#[tokio::test]
async fn test_connectivity_refused_is_false() {
    let client = client_for("http://127.0.0.1:1", None, Duration::from_secs(1));
    assert!(!client.check_connectivity().await);
}

#[tokio::test]
async fn test_connectivity_timeout_is_false() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), None, Duration::from_millis(200));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    assert!(!client.check_connectivity().await);
}

// ── Enable / disable ────────────────────────────────────────────────

#[tokio::test]
async fn test_enable_sends_token() {
    let (server, client) = setup(Some("s3cr3t")).await;

    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("enable", ""))
        .and(query_param("auth", "s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "enabled" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.set_enabled(true).await.unwrap();
    assert_eq!(status, "enabled");
}

#[tokio::test]
async fn test_disable_permanently() {
    let (server, client) = setup(Some("s3cr3t")).await;

    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("disable", ""))
        .and(query_param("auth", "s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "disabled" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.set_enabled(false).await.unwrap();
    assert_eq!(status, "disabled");
}

#[tokio::test]
async fn test_disable_for_seconds() {
    let (server, client) = setup(Some("s3cr3t")).await;

    Mock::given(method("GET"))
        .and(path(API))
        .and(query_param("disable", "300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "disabled" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.disable(300).await.unwrap();
    assert_eq!(status, "disabled");
}

#[tokio::test]
async fn test_mutator_without_token_sends_nothing() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "enabled" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.enable().await.unwrap_err();
    assert!(matches!(err, Error::MissingCredential(_)), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let (_server, client) = setup(Some("")).await;
    let err = client.disable(0).await.unwrap_err();
    assert!(matches!(err, Error::MissingCredential(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_rejected_token_surfaces_as_parse_error() {
    let (server, client) = setup(Some("wrong")).await;

    // Pi-hole answers a bad token with an empty array.
    Mock::given(method("GET"))
        .and(path(API))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client.enable().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(!err.to_string().contains("wrong"));
}

#[tokio::test]
async fn test_http_error_target_is_redacted() {
    let (server, client) = setup(Some("s3cr3t")).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.enable().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("auth=*****"), "got: {message}");
    assert!(!message.contains("s3cr3t"), "got: {message}");
}
