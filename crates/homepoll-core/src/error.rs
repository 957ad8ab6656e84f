// ── Core error types ──
//
// Errors surfaced by device adapters and the orchestrator. The
// `From<homepoll_api::Error>` impl folds the client taxonomy into
// orchestrator-level outcomes; none of them is fatal to a handler.

use thiserror::Error;

use homepoll_api::ErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device: {reason}")]
    Unreachable { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Remote player not found: {name}")]
    PlayerNotFound { name: String },

    #[error("Unexpected response: {message}")]
    Parse { message: String },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Unknown channel '{channel}'")]
    UnknownChannel { channel: String },

    #[error("Failed to handle {channel} command {command}")]
    UnsupportedCommand { channel: String, command: String },

    #[error("Device is still connecting")]
    NotReady,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        kind: ErrorKind,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether this outcome should take the device offline.
    ///
    /// Only command routing failures do; client failures are logged and
    /// leave the last published state in place.
    pub fn marks_offline(&self) -> bool {
        matches!(
            self,
            Self::UnknownChannel { .. } | Self::UnsupportedCommand { .. }
        )
    }
}

// ── Conversion from client errors ────────────────────────────────────

impl From<homepoll_api::Error> for CoreError {
    fn from(err: homepoll_api::Error) -> Self {
        use homepoll_api::Error as ApiError;

        let kind = err.kind();
        let message = err.to_string();
        let login_rejected = is_login_rejection(&err);
        match err {
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Transport(ref e) if e.is_timeout() => CoreError::Timeout { timeout_secs: 0 },
            ApiError::Transport(ref e) if e.is_connect() => CoreError::Unreachable {
                reason: e.to_string(),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::MissingCredential(what) => CoreError::Config {
                message: format!("{what} is not configured"),
            },
            ApiError::Deserialization { message, body: _ } => CoreError::Parse { message },
            ApiError::PlayerNotFound { name } => CoreError::PlayerNotFound { name },
            ApiError::ServerRejected { .. } if login_rejected => {
                CoreError::AuthenticationFailed { message }
            }
            _ => CoreError::Api { message, kind },
        }
    }
}

/// A rejection of the login call itself, as opposed to a later
/// session-scoped call.
fn is_login_rejection(err: &homepoll_api::Error) -> bool {
    matches!(err, homepoll_api::Error::ServerRejected { target, .. } if target.contains("method=login"))
}
