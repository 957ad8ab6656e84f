//! CLI error types with miette diagnostics.
//!
//! Maps core, client, and config failures into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use homepoll_config::ConfigError;
use homepoll_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device")]
    #[diagnostic(
        code(homepoll::unreachable),
        help(
            "Check that the device is powered and reachable from this host.\n\
             {reason}"
        )
    )]
    Unreachable { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(homepoll::timeout),
        help("Increase the timeout with --timeout or check the device's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(homepoll::auth_failed),
        help(
            "Verify the username and password for this device.\n\
             {message}"
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured")]
    #[diagnostic(
        code(homepoll::no_credentials),
        help("Pass --{what}, set HOMEPOLL_{env}, or add it to the device entry.")
    )]
    NoCredentials { what: String, env: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Remote player '{name}' not found")]
    #[diagnostic(
        code(homepoll::player_not_found),
        help("Run: homepoll audio players")
    )]
    PlayerNotFound { name: String },

    #[error("Device '{name}' not found in configuration")]
    #[diagnostic(
        code(homepoll::device_not_found),
        help("Run: homepoll config devices")
    )]
    DeviceNotFound { name: String },

    #[error("Device '{name}' is a {actual} device, not a {expected} device")]
    #[diagnostic(code(homepoll::wrong_kind))]
    WrongKind {
        name: String,
        actual: String,
        expected: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(homepoll::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homepoll::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No {kind} device selected")]
    #[diagnostic(
        code(homepoll::no_device),
        help(
            "Pass --url for an ad-hoc device, --device to pick a configured one,\n\
             or set default_device in {path}"
        )
    )]
    NoDevice { kind: String, path: String },

    #[error("No devices configured")]
    #[diagnostic(code(homepoll::no_config), help("Add [devices.<name>] entries to {path}"))]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(homepoll::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PlayerNotFound { .. } | Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::WrongKind { .. }
            | Self::NoDevice { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Api { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { reason } => Self::Unreachable { reason },
            CoreError::Timeout { .. } => Self::Timeout,
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::PlayerNotFound { name } => Self::PlayerNotFound { name },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            other => Self::Api {
                message: other.to_string(),
            },
        }
    }
}

impl From<homepoll_api::Error> for CliError {
    fn from(err: homepoll_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownDevice { name } => Self::DeviceNotFound { name },
            ConfigError::NoCredentials { what, .. } => Self::NoCredentials {
                what: what.into(),
                env: what.to_uppercase(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
