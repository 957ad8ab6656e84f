// Audio Station HTTP client
//
// Wraps `reqwest::Client` with Synology URL construction, envelope
// unwrapping, and the session state (sid + resolved player). Endpoint
// groups (auth, remote player) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use serde::de::DeserializeOwned;
use url::Url;

use crate::audio_station::models::RawEnvelope;
use crate::error::Error;
use crate::transport::{self, DeviceEndpoint, TransportConfig};

pub(crate) const AUTH_PATH: &str = "webapi/auth.cgi";
pub(crate) const REMOTE_PLAYER_PATH: &str = "webapi/AudioStation/remote_player.cgi";
pub(crate) const SESSION_NAME: &str = "AudioStation";

/// Where the session is in the login -> player-resolution sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    AuthenticatedNoPlayer,
    Ready,
}

/// Session identifier and resolved remote player.
///
/// Only the client's transition methods (`login`, `resolve_player`,
/// `logout`) modify it. A failed session-scoped request leaves it as-is:
/// the client does not track expiry and never re-logs in on its own.
#[derive(Debug, Clone, Default)]
pub struct Session {
    sid: Option<String>,
    player_id: Option<String>,
    player_name: Option<String>,
}

impl Session {
    pub fn state(&self) -> SessionState {
        match (&self.sid, &self.player_id) {
            (None, _) => SessionState::Unauthenticated,
            (Some(_), None) => SessionState::AuthenticatedNoPlayer,
            (Some(_), Some(_)) => SessionState::Ready,
        }
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    /// Name the current player id was resolved from.
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub(crate) fn set_sid(&mut self, sid: String) {
        self.sid = Some(sid);
    }

    pub(crate) fn set_player(&mut self, id: String, name: String) {
        self.player_id = Some(id);
        self.player_name = Some(name);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// HTTP client for one Audio Station remote player.
///
/// Owns its session; `login` and `resolve_player` take `&mut self`, so
/// callers sharing a client across tasks must serialize access.
pub struct AudioStationClient {
    http: reqwest::Client,
    endpoint: DeviceEndpoint,
    pub(crate) session: Session,
}

impl AudioStationClient {
    /// Create a client for a DSM base URL (e.g. `http://nas.local:5000`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let endpoint = DeviceEndpoint::new(base_url, transport.timeout)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: DeviceEndpoint) -> Self {
        Self {
            http,
            endpoint,
            session: Session::default(),
        }
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Liveness probe against the base URL. Never errors.
    pub async fn check_connectivity(&self) -> bool {
        transport::probe(
            &self.http,
            self.endpoint.base_url().clone(),
            self.endpoint.timeout(),
        )
        .await
    }

    // ── Preconditions ────────────────────────────────────────────────

    pub(crate) fn require_sid(&self) -> Result<&str, Error> {
        self.session
            .sid()
            .filter(|s| !s.is_empty())
            .ok_or(Error::NotLoggedIn)
    }

    pub(crate) fn require_player(&self) -> Result<&str, Error> {
        self.session
            .player_id()
            .filter(|p| !p.is_empty())
            .ok_or(Error::NoPlayer)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/webapi/auth.cgi?api=SYNO.API.Auth&version=3&method={method}&...`
    pub(crate) fn auth_url(&self, method: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.endpoint.url(AUTH_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api", "SYNO.API.Auth")
                .append_pair("method", method)
                .append_pair("version", "3");
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// `{base}/webapi/AudioStation/remote_player.cgi?api=SYNO.AudioStation.RemotePlayer&version=2&method={method}&_sid={sid}[&id={player}]&...`
    pub(crate) fn player_url(
        &self,
        method: &str,
        player_id: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<Url, Error> {
        let sid = self.require_sid()?;
        let mut url = self.endpoint.url(REMOTE_PLAYER_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api", "SYNO.AudioStation.RemotePlayer")
                .append_pair("version", "2")
                .append_pair("method", method)
                .append_pair("_sid", sid);
            if let Some(id) = player_id {
                query.append_pair("id", id);
            }
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET and unwrap the `{success, data}` envelope.
    pub(crate) async fn call<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let target = transport::redact(&url);
        let body = transport::get_text(&self.http, url, self.endpoint.timeout()).await?;
        parse_envelope(&body, &target)
    }
}

/// Parse the `{ success, data }` envelope, returning `data` decoded as `T`
/// or `Error::ServerRejected` when `success` is absent or false.
///
/// Calls that return no payload decode into `serde::de::IgnoredAny`.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str, target: &str) -> Result<T, Error> {
    let envelope: RawEnvelope =
        serde_json::from_str(body).map_err(|e| Error::deserialization(&e, body))?;

    if envelope.success != Some(true) {
        return Err(Error::ServerRejected {
            target: target.to_owned(),
            code: envelope.error.and_then(|e| e.code),
        });
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| Error::deserialization(&e, body))
}
