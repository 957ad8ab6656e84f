//! Configuration for homepoll.
//!
//! TOML device entries, credential resolution (env var + plaintext), and
//! translation to `homepoll_core::DeviceConfig`. The CLI layers its
//! command-line overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use homepoll_api::SummaryFormat;
use homepoll_core::config::{AUDIO_STATION_INITIAL_DELAY, PIHOLE_INITIAL_DELAY};
use homepoll_core::{
    AudioStationConfig, DeviceConfig, PiHoleConfig, Schedule, TlsVerification,
};

/// Prefix for environment overrides. Nested keys use `__`, e.g.
/// `HOMEPOLL_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "HOMEPOLL_";

/// Replaces secrets when a config is rendered for display.
const REDACTED: &str = "*****";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {what} configured for device '{device}'")]
    NoCredentials { device: String, what: &'static str },

    #[error("no device named '{name}' in config")]
    UnknownDevice { name: String },

    #[error("no device selected and config has {count} devices")]
    AmbiguousDevice { count: usize },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Device used when none is selected on the command line.
    pub default_device: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named devices.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between polls. 0 disables periodic polling.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Accept self-signed certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
            insecure: default_insecure(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
fn default_refresh_interval() -> u64 {
    60
}
fn default_insecure() -> bool {
    true
}

/// Settings every device kind shares.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Connection {
    /// Device base URL (e.g., "http://pi.hole").
    pub url: String,

    /// Override the poll interval (seconds).
    pub refresh_interval: Option<u64>,

    /// Override the delay before the first poll (seconds).
    pub initial_delay: Option<u64>,

    /// Override the request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override the insecure TLS setting.
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

/// A configured device, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceEntry {
    Pihole(PiHoleEntry),
    AudioStation(AudioStationEntry),
}

impl DeviceEntry {
    pub fn connection(&self) -> &Connection {
        match self {
            Self::Pihole(e) => &e.connection,
            Self::AudioStation(e) => &e.connection,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pihole(_) => "pihole",
            Self::AudioStation(_) => "audio_station",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PiHoleEntry {
    #[serde(flatten)]
    pub connection: Connection,

    /// API token (plaintext -- prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable holding the API token.
    pub token_env: Option<String>,

    /// Request the formatted (`?summary`) rendering instead of raw.
    #[serde(default)]
    pub formatted_summary: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AudioStationEntry {
    #[serde(flatten)]
    pub connection: Connection,

    pub username: Option<String>,

    /// Password (plaintext -- prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Remote player name, matched exactly.
    pub player: String,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "homepoll", "homepoll").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homepoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

impl Config {
    /// Render as TOML with every plaintext secret replaced.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut copy = self.clone();
        for entry in copy.devices.values_mut() {
            match entry {
                DeviceEntry::Pihole(e) => {
                    if e.token.is_some() {
                        e.token = Some(REDACTED.into());
                    }
                }
                DeviceEntry::AudioStation(e) => {
                    if e.password.is_some() {
                        e.password = Some(REDACTED.into());
                    }
                }
            }
        }
        Ok(toml::to_string_pretty(&copy)?)
    }

    /// Pick the device to act on: the named one, else `default_device`,
    /// else the only configured device.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &DeviceEntry), ConfigError> {
        let name = match name.or(self.default_device.as_deref()) {
            Some(name) => name,
            None if self.devices.len() == 1 => {
                return self
                    .devices
                    .iter()
                    .next()
                    .map(|(n, e)| (n.as_str(), e))
                    .ok_or(ConfigError::AmbiguousDevice { count: 0 });
            }
            None => {
                return Err(ConfigError::AmbiguousDevice {
                    count: self.devices.len(),
                });
            }
        };

        self.devices
            .get_key_value(name)
            .map(|(n, e)| (n.as_str(), e))
            .ok_or_else(|| ConfigError::UnknownDevice { name: name.into() })
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a secret: the named env var wins over plaintext.
///
/// `lookup` abstracts the environment so callers can inject one.
pub fn resolve_secret(
    env_name: Option<&str>,
    plaintext: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if let Some(value) = env_name.and_then(&lookup) {
        return Some(SecretString::from(value));
    }
    plaintext.map(|p| SecretString::from(p.to_owned()))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ── Translation to runtime config ───────────────────────────────────

/// Build a `DeviceConfig` from an entry, reading credentials from the
/// process environment.
pub fn to_device_config(
    name: &str,
    entry: &DeviceEntry,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    to_device_config_with(name, entry, defaults, env_lookup)
}

/// [`to_device_config`] with an injectable environment.
pub fn to_device_config_with(
    name: &str,
    entry: &DeviceEntry,
    defaults: &Defaults,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DeviceConfig, ConfigError> {
    let connection = entry.connection();
    let url = parse_url(&connection.url)?;
    let tls = tls_for(connection, defaults);

    match entry {
        DeviceEntry::Pihole(e) => {
            let schedule = schedule_for(connection, defaults, PIHOLE_INITIAL_DELAY)?;
            let token = resolve_secret(e.token_env.as_deref(), e.token.as_deref(), &lookup);
            Ok(DeviceConfig::PiHole(PiHoleConfig {
                url,
                token,
                summary_format: if e.formatted_summary {
                    SummaryFormat::Formatted
                } else {
                    SummaryFormat::Raw
                },
                tls,
                schedule,
            }))
        }
        DeviceEntry::AudioStation(e) => {
            let schedule = schedule_for(connection, defaults, AUDIO_STATION_INITIAL_DELAY)?;
            let username = e
                .username
                .clone()
                .or_else(|| lookup("HOMEPOLL_USERNAME"))
                .ok_or_else(|| ConfigError::NoCredentials {
                    device: name.into(),
                    what: "username",
                })?;
            let password = resolve_secret(e.password_env.as_deref(), e.password.as_deref(), &lookup)
                .or_else(|| lookup("HOMEPOLL_PASSWORD").map(SecretString::from))
                .ok_or_else(|| ConfigError::NoCredentials {
                    device: name.into(),
                    what: "password",
                })?;
            if e.player.is_empty() {
                return Err(ConfigError::Validation {
                    field: "player".into(),
                    reason: format!("device '{name}' needs a remote player name"),
                });
            }
            Ok(DeviceConfig::AudioStation(AudioStationConfig {
                url,
                username,
                password,
                player: e.player.clone(),
                tls,
                schedule,
            }))
        }
    }
}

/// Translate every configured device, in name order.
pub fn all_device_configs(config: &Config) -> Result<Vec<(String, DeviceConfig)>, ConfigError> {
    config
        .devices
        .iter()
        .map(|(name, entry)| {
            to_device_config(name, entry, &config.defaults).map(|c| (name.clone(), c))
        })
        .collect()
}

pub fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn tls_for(connection: &Connection, defaults: &Defaults) -> TlsVerification {
    if let Some(ref ca_path) = connection.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if connection.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    }
}

fn schedule_for(
    connection: &Connection,
    defaults: &Defaults,
    initial_delay: Duration,
) -> Result<Schedule, ConfigError> {
    let timeout = connection.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    Ok(Schedule {
        initial_delay: connection
            .initial_delay
            .map_or(initial_delay, Duration::from_secs),
        interval: Duration::from_secs(
            connection
                .refresh_interval
                .unwrap_or(defaults.refresh_interval),
        ),
        timeout: Duration::from_secs(timeout),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_device = "pihole"

[defaults]
timeout = 7
refresh_interval = 30

[devices.pihole]
kind = "pihole"
url = "http://pi.hole"
token_env = "PIHOLE_TOKEN"
token = "fallback"

[devices.kitchen]
kind = "audio_station"
url = "https://nas.local:5001"
username = "admin"
password = "hunter2"
player = "Kitchen"
initial_delay = 5
insecure = false
"#;

    fn sample() -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        load_config_from(file.path()).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults.timeout, 5);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn parses_tagged_devices() {
        let config = sample();
        assert_eq!(config.devices.len(), 2);
        assert!(matches!(config.devices["pihole"], DeviceEntry::Pihole(_)));
        assert_eq!(config.devices["kitchen"].kind(), "audio_station");
        assert_eq!(config.devices["kitchen"].connection().initial_delay, Some(5));
    }

    #[test]
    fn token_env_wins_over_plaintext() {
        let config = sample();
        let lookup = |name: &str| (name == "PIHOLE_TOKEN").then(|| "from-env".to_owned());

        let DeviceConfig::PiHole(pihole) =
            to_device_config_with("pihole", &config.devices["pihole"], &config.defaults, lookup)
                .unwrap()
        else {
            panic!("expected a Pi-hole config");
        };
        assert_eq!(pihole.token.unwrap().expose_secret(), "from-env");
        assert_eq!(pihole.schedule.initial_delay, PIHOLE_INITIAL_DELAY);
        assert_eq!(pihole.schedule.interval, Duration::from_secs(30));
        assert_eq!(pihole.schedule.timeout, Duration::from_secs(7));
        assert_eq!(pihole.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn plaintext_token_is_fallback() {
        let config = sample();
        let DeviceConfig::PiHole(pihole) =
            to_device_config_with("pihole", &config.devices["pihole"], &config.defaults, no_env)
                .unwrap()
        else {
            panic!("expected a Pi-hole config");
        };
        assert_eq!(pihole.token.unwrap().expose_secret(), "fallback");
    }

    #[test]
    fn audio_station_entry_translates() {
        let config = sample();
        let DeviceConfig::AudioStation(audio) = to_device_config_with(
            "kitchen",
            &config.devices["kitchen"],
            &config.defaults,
            no_env,
        )
        .unwrap() else {
            panic!("expected an Audio Station config");
        };
        assert_eq!(audio.player, "Kitchen");
        assert_eq!(audio.password.expose_secret(), "hunter2");
        assert_eq!(audio.schedule.initial_delay, Duration::from_secs(5));
        assert_eq!(audio.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn missing_password_is_reported() {
        let entry = DeviceEntry::AudioStation(AudioStationEntry {
            connection: Connection {
                url: "http://nas".into(),
                ..Connection::default()
            },
            username: Some("admin".into()),
            player: "Kitchen".into(),
            ..AudioStationEntry::default()
        });

        let err = to_device_config_with("nas", &entry, &Defaults::default(), no_env).unwrap_err();
        assert_eq!(err.to_string(), "no password configured for device 'nas'");
    }

    #[test]
    fn rejects_non_http_url() {
        let err = parse_url("ftp://pi.hole").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn select_prefers_explicit_then_default() {
        let config = sample();
        assert_eq!(config.select(Some("kitchen")).unwrap().0, "kitchen");
        assert_eq!(config.select(None).unwrap().0, "pihole");
        assert!(matches!(
            config.select(Some("garage")),
            Err(ConfigError::UnknownDevice { .. })
        ));

        let mut two = config.clone();
        two.default_device = None;
        assert!(matches!(
            two.select(None),
            Err(ConfigError::AmbiguousDevice { count: 2 })
        ));
    }

    #[test]
    fn redacted_rendering_hides_secrets() {
        let rendered = sample().to_redacted_toml().unwrap();
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("fallback"));
        assert!(rendered.contains("token_env = \"PIHOLE_TOKEN\""));
    }
}
