// Pi-hole admin API client
//
// Every call is a GET against `{base}/admin/api.php` with the operation
// encoded as a bare query key (`?summaryRaw`, `?enable`, `?disable=60`).
// Mutators additionally carry `auth={token}`; the token is redacted from
// every log line.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::pihole::models::{PiHoleSummary, StatusResponse};
use crate::snapshot::SummarySnapshot;
use crate::transport::{self, DeviceEndpoint, TransportConfig};

const API_PATH: &str = "admin/api.php";

/// Which summary rendering to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    /// `?summaryRaw` -- counters as JSON numbers.
    #[default]
    Raw,
    /// `?summary` -- counters as grouped strings (`"12,345"`).
    Formatted,
}

impl SummaryFormat {
    fn query_key(self) -> &'static str {
        match self {
            Self::Raw => "summaryRaw",
            Self::Formatted => "summary",
        }
    }
}

/// HTTP client for a single Pi-hole instance.
///
/// Holds no mutable state: the endpoint and token are fixed at
/// construction, so a shared reference is enough for every operation.
pub struct PiHoleClient {
    http: reqwest::Client,
    endpoint: DeviceEndpoint,
    token: Option<SecretString>,
    format: SummaryFormat,
}

impl PiHoleClient {
    /// Create a client from a base URL (e.g. `http://pi.hole`) and an
    /// optional API token. Read-only calls work without a token.
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let endpoint = DeviceEndpoint::new(base_url, transport.timeout)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoint, token))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: DeviceEndpoint,
        token: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            endpoint,
            token,
            format: SummaryFormat::default(),
        }
    }

    /// Request `?summary` or `?summaryRaw`.
    pub fn with_summary_format(mut self, format: SummaryFormat) -> Self {
        self.format = format;
        self
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    // ── Reads ─────────────────────────────────────────────────────────

    /// Fetch and validate the dashboard summary.
    ///
    /// `GET {base}/admin/api.php?summaryRaw`
    pub async fn fetch_summary(&self) -> Result<PiHoleSummary, Error> {
        let mut url = self.api_url()?;
        url.query_pairs_mut().append_key_only(self.format.query_key());

        let body = self.get(url).await?;
        let summary: PiHoleSummary =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

        debug!(status = %summary.status, "fetched summary");
        Ok(summary)
    }

    /// [`fetch_summary`](Self::fetch_summary) flattened into a snapshot.
    pub async fn fetch_snapshot(&self) -> Result<SummarySnapshot, Error> {
        Ok(self.fetch_summary().await?.to_snapshot())
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

    // ── Mutators ──────────────────────────────────────────────────────

    /// Turn blocking on or off (off = indefinitely).
    ///
    /// Returns the status reported by the server.
    pub async fn set_enabled(&self, on: bool) -> Result<String, Error> {
        if on { self.enable().await } else { self.disable(0).await }
    }

    /// `GET {base}/admin/api.php?enable&auth={token}`
    pub async fn enable(&self) -> Result<String, Error> {
        info!("enabling Pi-hole blocking");
        self.set_status("enable", None).await
    }

    /// `GET {base}/admin/api.php?disable[={seconds}]&auth={token}`
    ///
    /// `seconds == 0` disables until re-enabled.
    pub async fn disable(&self, seconds: u64) -> Result<String, Error> {
        info!(seconds, "disabling Pi-hole blocking (0 = permanent)");
        let value = (seconds > 0).then(|| seconds.to_string());
        self.set_status("disable", value.as_deref()).await
    }

    async fn set_status(&self, command: &str, value: Option<&str>) -> Result<String, Error> {
        let token = self.token()?;

        let mut url = self.api_url()?;
        {
            let mut query = url.query_pairs_mut();
            match value {
                Some(value) => query.append_pair(command, value),
                None => query.append_key_only(command),
            };
            query.append_pair("auth", token.expose_secret());
        }

        let body = self.get(url).await?;
        let resp: StatusResponse =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

        debug!(status = %resp.status, "{command} acknowledged");
        Ok(resp.status)
    }

    // ── Helpers ───────────────────────────────────────────────────────

    fn api_url(&self) -> Result<Url, Error> {
        self.endpoint.url(API_PATH)
    }

    fn token(&self) -> Result<&SecretString, Error> {
        self.token
            .as_ref()
            .filter(|t| !t.expose_secret().is_empty())
            .ok_or(Error::MissingCredential("Pi-hole API token"))
    }

    async fn get(&self, url: Url) -> Result<String, Error> {
        transport::get_text(&self.http, url, self.endpoint.timeout()).await
    }
}
