#![allow(clippy::unwrap_used)]
// Integration tests for `AudioStationClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homepoll_api::{
    AudioStationClient, DeviceEndpoint, Error, ErrorKind, PlayerAction, SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

const AUTH: &str = "/webapi/auth.cgi";
const PLAYER: &str = "/webapi/AudioStation/remote_player.cgi";

async fn setup() -> (MockServer, AudioStationClient) {
    let server = MockServer::start().await;
    let endpoint = DeviceEndpoint::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let client = AudioStationClient::with_client(reqwest::Client::new(), endpoint);
    (server, client)
}

fn password() -> SecretString {
    SecretString::from("hunter2".to_string())
}

async fn mount_login(server: &MockServer, sid: &str) {
    Mock::given(method("GET"))
        .and(path(AUTH))
        .and(query_param("method", "login"))
        .and(query_param("account", "admin"))
        .and(query_param("passwd", "hunter2"))
        .and(query_param("session", "AudioStation"))
        .and(query_param("format", "sid"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "sid": sid } })),
        )
        .mount(server)
        .await;
}

async fn mount_players(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "list"))
        .and(query_param("_sid", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "players": [
                    { "id": "uuid:living", "name": "Living Room", "type": "upnp" },
                    { "id": "uuid:kitchen", "name": "Kitchen", "type": "airplay" },
                    { "id": "uuid:kitchen-2", "name": "Kitchen", "type": "upnp" },
                    { "id": "uuid:lower", "name": "kitchen", "type": "upnp" }
                ]
            }
        })))
        .mount(server)
        .await;
}

/// Log in and resolve "Kitchen".
async fn ready_client() -> (MockServer, AudioStationClient) {
    let (server, mut client) = setup().await;
    mount_login(&server, "abc123").await;
    mount_players(&server).await;
    client.login("admin", &password()).await.unwrap();
    client.resolve_player("Kitchen").await.unwrap();
    (server, client)
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_sid() {
    let (server, mut client) = setup().await;
    mount_login(&server, "abc123").await;

    client.login("admin", &password()).await.unwrap();

    assert_eq!(client.session().sid(), Some("abc123"));
    assert_eq!(client.session().state(), SessionState::AuthenticatedNoPlayer);
}

#[tokio::test]
async fn test_login_rejected_leaves_session_empty() {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .and(path(AUTH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": { "code": 400 } })),
        )
        .mount(&server)
        .await;

    let err = client.login("admin", &password()).await.unwrap_err();

    assert!(matches!(err, Error::ServerRejected { code: Some(400), .. }), "got: {err:?}");
    assert!(!err.to_string().contains("hunter2"));
    assert_eq!(client.session().sid(), None);
    assert_eq!(client.session().state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_login_garbage_is_parse_error() {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .and(path(AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>DSM</html>"))
        .mount(&server)
        .await;

    let err = client.login("admin", &password()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(client.session().sid(), None);
}

#[tokio::test]
async fn test_login_requires_username() {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.login("", &password()).await.unwrap_err();
    assert!(matches!(err, Error::MissingCredential(_)));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (server, mut client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(AUTH))
        .and(query_param("method", "logout"))
        .and(query_param("_sid", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
    assert_eq!(client.session().state(), SessionState::Unauthenticated);

    // Second logout is a local no-op.
    client.logout().await.unwrap();
}

// ── Preconditions ───────────────────────────────────────────────────

#[tokio::test]
async fn test_session_calls_before_login_fail_fast() {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.list_players().await.unwrap_err();
    assert!(matches!(err, Error::NotLoggedIn), "got: {err:?}");

    let err = client.resolve_player("Kitchen").await.unwrap_err();
    assert!(matches!(err, Error::NotLoggedIn), "got: {err:?}");

    let err = client.try_send_control(PlayerAction::Play).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let err = client.fetch_status().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let err = client.try_set_volume(20).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[tokio::test]
async fn test_player_calls_before_resolution_fail_fast() {
    let (server, mut client) = setup().await;
    mount_login(&server, "abc123").await;
    client.login("admin", &password()).await.unwrap();

    let err = client.try_send_control(PlayerAction::Pause).await.unwrap_err();
    assert!(matches!(err, Error::NoPlayer), "got: {err:?}");
}

// ── Player resolution ───────────────────────────────────────────────

#[tokio::test]
async fn test_resolve_player_exact_first_match() {
    let (_server, client) = ready_client().await;

    assert_eq!(client.session().player_id(), Some("uuid:kitchen"));
    assert_eq!(client.session().player_name(), Some("Kitchen"));
    assert_eq!(client.session().state(), SessionState::Ready);
}

#[tokio::test]
async fn test_resolve_player_is_idempotent() {
    let (_server, mut client) = ready_client().await;

    let again = client.resolve_player("Kitchen").await.unwrap();
    assert_eq!(again, "uuid:kitchen");
    assert_eq!(client.session().player_id(), Some("uuid:kitchen"));
}

#[tokio::test]
async fn test_resolve_unknown_player_keeps_previous() {
    let (_server, mut client) = ready_client().await;

    let err = client.resolve_player("Garage").await.unwrap_err();

    assert!(matches!(err, Error::PlayerNotFound { ref name } if name == "Garage"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(client.session().player_id(), Some("uuid:kitchen"));
}

#[tokio::test]
async fn test_resolve_player_is_case_sensitive() {
    let (_server, mut client) = ready_client().await;

    let id = client.resolve_player("kitchen").await.unwrap();
    assert_eq!(id, "uuid:lower");
}

// ── Control ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_control_carries_sid_and_player() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "control"))
        .and(query_param("_sid", "abc123"))
        .and(query_param("id", "uuid:kitchen"))
        .and(query_param("action", "play"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.send_control(PlayerAction::Play).await;
}

#[tokio::test]
async fn test_control_failure_is_swallowed() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "control"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    // Fire-and-forget: returns unit even though the server failed.
    client.send_control(PlayerAction::Next).await;

    let err = client.try_send_control(PlayerAction::Next).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn test_rejected_call_keeps_session() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "control"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let err = client.try_send_control(PlayerAction::Stop).await.unwrap_err();

    assert!(matches!(err, Error::ServerRejected { code: None, .. }), "got: {err:?}");
    assert_eq!(client.session().sid(), Some("abc123"));
    assert_eq!(client.session().state(), SessionState::Ready);
}

// ── Volume ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_volume_sends_value() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "control"))
        .and(query_param("action", "set_volume"))
        .and(query_param("value", "40"))
        .and(query_param("id", "uuid:kitchen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.try_set_volume(40).await.unwrap();
}

#[tokio::test]
async fn test_volume_out_of_range_is_rejected_locally() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "control"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.try_set_volume(150).await.unwrap_err();
    assert!(matches!(err, Error::VolumeOutOfRange { value: 150 }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Precondition);

    // Fire-and-forget form swallows the same error.
    client.set_volume(101).await;
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_status() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "getstatus"))
        .and(query_param("additional", "song_tag"))
        .and(query_param("id", "uuid:kitchen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "state": "playing",
                "volume": 35,
                "position": 61,
                "song": {
                    "title": "Teardrop",
                    "additional": {
                        "song_tag": {
                            "album": "Mezzanine",
                            "album_artist": "Massive Attack",
                            "artist": "Massive Attack"
                        }
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    let snapshot = client.fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.get("state"), Some("playing"));
    assert_eq!(snapshot.get("volume"), Some("35"));
    assert_eq!(snapshot.get("album"), Some("Mezzanine"));
    assert_eq!(snapshot.get("artist"), Some("Massive Attack"));
    assert_eq!(snapshot.get("title"), Some("Teardrop"));
}

#[tokio::test]
async fn test_fetch_status_envelope_failure() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "getstatus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": { "code": 106 } })),
        )
        .mount(&server)
        .await;

    let err = client.fetch_status().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerRejected);
    assert!(err.to_string().contains("(code 106)"), "{err}");
}

#[tokio::test]
async fn test_fetch_status_missing_state_is_parse_error() {
    let (server, client) = ready_client().await;

    Mock::given(method("GET"))
        .and(path(PLAYER))
        .and(query_param("method", "getstatus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "volume": 10 } })),
        )
        .mount(&server)
        .await;

    let err = client.fetch_status().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
