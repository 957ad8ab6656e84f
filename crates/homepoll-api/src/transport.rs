// Shared transport configuration and request plumbing.
//
// Both device clients build their reqwest::Client, resolve endpoint URLs,
// redact secrets for logging, and issue GET requests through this module.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Query keys whose values must never reach a log line.
const SECRET_QUERY_KEYS: &[&str] = &["auth", "passwd", "_sid"];

/// Marker substituted for secret query values.
pub const REDACTED: &str = "*****";

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed appliances).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("homepoll/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Base URL and request timeout of one device.
///
/// Immutable once built. The trailing slash of the configured URL is
/// stripped so endpoint paths can be appended with a single `/`.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    base: String,
    base_url: Url,
    timeout: Duration,
}

impl DeviceEndpoint {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, Error> {
        let base = base.trim_end_matches('/').to_owned();
        let base_url = Url::parse(&base)?;
        Ok(Self {
            base,
            base_url,
            timeout,
        })
    }

    /// The device root, used for liveness probes.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build `{base}/{path}`.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}/{}", self.base, path.trim_start_matches('/')))?)
    }
}

/// Render a URL for logging with every secret query value replaced by
/// [`REDACTED`]. Key-only parameters (`?summaryRaw`) are kept as-is.
pub fn redact(url: &Url) -> String {
    let Some(query) = url.query() else {
        return url.to_string();
    };

    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SECRET_QUERY_KEYS.contains(&key) => format!("{key}={REDACTED}"),
            _ => pair.to_owned(),
        })
        .collect();

    let mut out = url.clone();
    out.set_query(None);
    let mut rendered = out.to_string();
    rendered.push('?');
    rendered.push_str(&redacted.join("&"));
    rendered
}

/// Send a GET and return the body of an HTTP 200 response.
///
/// Any other status, a timeout, or a transport failure is an error. The
/// URL is stripped from reqwest errors so secrets in the query string
/// cannot leak through `Display`.
pub(crate) async fn get_text(
    http: &reqwest::Client,
    url: Url,
    timeout: Duration,
) -> Result<String, Error> {
    let target = redact(&url);
    debug!("GET {}", target);

    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| send_error(e, timeout))?;

    let status = resp.status();
    if status != StatusCode::OK {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            target,
        });
    }

    resp.text().await.map_err(|e| send_error(e, timeout))
}

/// Liveness probe: `true` only when the URL answers HTTP 200.
pub(crate) async fn probe(http: &reqwest::Client, url: Url, timeout: Duration) -> bool {
    let target = redact(&url);
    match get_text(http, url, timeout).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "connectivity probe to {} failed", target);
            false
        }
    }
}

fn send_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        Error::Transport(err.without_url())
    }
}
