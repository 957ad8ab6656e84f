use thiserror::Error;

/// Top-level error type for the `homepoll-api` crate.
///
/// Covers every failure mode of both device clients: transport, payload
/// shape, envelope rejection, player lookup, and missing prerequisites.
/// `homepoll-core` maps these into orchestrator-level outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The device answered with something other than HTTP 200.
    /// `target` is the request URL with secrets redacted.
    #[error("Request {target} returned HTTP {status}")]
    HttpStatus { status: u16, target: String },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Audio Station ───────────────────────────────────────────────
    /// The `{success, data}` envelope reported `success: false` (or omitted it).
    #[error("Request {target} rejected by server{}", code_suffix(.code))]
    ServerRejected { target: String, code: Option<i64> },

    /// No remote player with the requested name.
    #[error("Remote player '{name}' not found")]
    PlayerNotFound { name: String },

    // ── Preconditions ───────────────────────────────────────────────
    /// A credential required by the operation is missing or empty.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Session-scoped call attempted before a successful login.
    #[error("Not logged in -- call login() first")]
    NotLoggedIn,

    /// Player-scoped call attempted before a player was resolved.
    #[error("No remote player resolved -- call resolve_player() first")]
    NoPlayer,

    /// Volume outside `0..=100`.
    #[error("Volume {value} out of range (0-100)")]
    VolumeOutOfRange { value: u32 },
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Connection refused, timeout, non-200 status.
    Transport,
    /// Malformed or unexpected JSON, missing field.
    Parse,
    /// Envelope `success=false`.
    ServerRejected,
    /// Named player absent from the list.
    NotFound,
    /// A required identifier was missing; no request was sent.
    Precondition,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_)
            | Self::InvalidUrl(_)
            | Self::Timeout { .. }
            | Self::HttpStatus { .. }
            | Self::Tls(_) => ErrorKind::Transport,
            Self::Deserialization { .. } => ErrorKind::Parse,
            Self::ServerRejected { .. } => ErrorKind::ServerRejected,
            Self::PlayerNotFound { .. } => ErrorKind::NotFound,
            Self::MissingCredential(_)
            | Self::NotLoggedIn
            | Self::NoPlayer
            | Self::VolumeOutOfRange { .. } => ErrorKind::Precondition,
        }
    }

    pub(crate) fn deserialization(err: &serde_json::Error, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::Deserialization {
            message: format!("{err} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            Error::HttpStatus { status: 500, target: "x".into() }.kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            Error::ServerRejected { target: "x".into(), code: None }.kind(),
            ErrorKind::ServerRejected
        );
        assert_eq!(Error::PlayerNotFound { name: "a".into() }.kind(), ErrorKind::NotFound);
        assert_eq!(Error::NotLoggedIn.kind(), ErrorKind::Precondition);
        assert_eq!(ErrorKind::ServerRejected.to_string(), "server_rejected");
    }

    #[test]
    fn rejected_message_includes_code() {
        let err = Error::ServerRejected { target: "auth.cgi".into(), code: Some(400) };
        assert_eq!(err.to_string(), "Request auth.cgi rejected by server (code 400)");
        let err = Error::ServerRejected { target: "auth.cgi".into(), code: None };
        assert_eq!(err.to_string(), "Request auth.cgi rejected by server");
    }
}
