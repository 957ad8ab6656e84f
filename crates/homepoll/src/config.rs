//! Resolve the device a one-shot command acts on: a config entry, an
//! ad-hoc device described by flags, and command-line overrides on top.

use std::time::Duration;

use secrecy::SecretString;

use homepoll_config::{Config, DeviceEntry, config_path, load_config, load_config_from, parse_url};
use homepoll_core::{AudioStationConfig, DeviceConfig, PiHoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Device kinds a one-shot command can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    PiHole,
    AudioStation,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Self::PiHole => "pihole",
            Self::AudioStation => "audio_station",
        }
    }
}

/// Load the config file named by `--config`, else the platform default.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = match global.config {
        Some(ref path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

pub fn display_path(global: &GlobalOpts) -> String {
    global
        .config
        .clone()
        .unwrap_or_else(config_path)
        .display()
        .to_string()
}

/// Resolve a Pi-hole, with flag overrides applied.
pub fn pihole(global: &GlobalOpts) -> Result<(String, PiHoleConfig), CliError> {
    let (name, config) = resolve(global, Kind::PiHole)?;
    match config {
        DeviceConfig::PiHole(c) => Ok((name, c)),
        DeviceConfig::AudioStation(_) => Err(wrong_kind(name, Kind::AudioStation, Kind::PiHole)),
    }
}

/// Resolve an Audio Station player, with flag overrides applied.
pub fn audio_station(global: &GlobalOpts) -> Result<(String, AudioStationConfig), CliError> {
    let (name, config) = resolve(global, Kind::AudioStation)?;
    match config {
        DeviceConfig::AudioStation(c) => Ok((name, c)),
        DeviceConfig::PiHole(_) => Err(wrong_kind(name, Kind::PiHole, Kind::AudioStation)),
    }
}

/// `--device` picks a config entry. Without it, `--url` describes an
/// ad-hoc device; otherwise `default_device` or the only entry of the
/// requested kind is used.
fn resolve(global: &GlobalOpts, kind: Kind) -> Result<(String, DeviceConfig), CliError> {
    let cfg = load(global)?;

    let selected = match global.device.as_deref() {
        Some(name) => Some(cfg.select(Some(name))?),
        None if global.url.is_some() => None,
        None => Some(select_of_kind(&cfg, kind).ok_or_else(|| CliError::NoDevice {
            kind: kind.name().into(),
            path: display_path(global),
        })?),
    };

    let (name, mut config) = match selected {
        Some((name, entry)) => {
            if entry.kind() != kind.name() {
                return Err(CliError::WrongKind {
                    name: name.into(),
                    actual: entry.kind().into(),
                    expected: kind.name().into(),
                });
            }
            let config = with_credential_flags(name, entry, global, &cfg)?;
            (name.to_owned(), config)
        }
        None => ("adhoc".to_owned(), from_flags(global, kind)?),
    };

    apply_overrides(&mut config, global)?;
    Ok((name, config))
}

fn select_of_kind(cfg: &Config, kind: Kind) -> Option<(&str, &DeviceEntry)> {
    let default = cfg
        .default_device
        .as_deref()
        .and_then(|name| cfg.devices.get_key_value(name))
        .filter(|(_, e)| e.kind() == kind.name());
    if let Some((name, entry)) = default {
        return Some((name.as_str(), entry));
    }

    let mut matching = cfg
        .devices
        .iter()
        .filter(|(_, e)| e.kind() == kind.name())
        .map(|(n, e)| (n.as_str(), e));
    let first = matching.next()?;
    matching.next().is_none().then_some(first)
}

/// Translate a config entry, letting credential flags stand in for
/// anything the entry leaves out.
fn with_credential_flags(
    name: &str,
    entry: &DeviceEntry,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<DeviceConfig, CliError> {
    let mut entry = entry.clone();
    if let DeviceEntry::AudioStation(ref mut e) = entry {
        if let Some(ref username) = global.username {
            e.username = Some(username.clone());
        }
        if let Some(ref password) = global.password {
            e.password = Some(password.clone());
            e.password_env = None;
        }
        if let Some(ref player) = global.player {
            e.player.clone_from(player);
        }
    }
    Ok(homepoll_config::to_device_config(name, &entry, &cfg.defaults)?)
}

fn from_flags(global: &GlobalOpts, kind: Kind) -> Result<DeviceConfig, CliError> {
    let raw = global.url.as_deref().ok_or_else(|| CliError::NoDevice {
        kind: kind.name().into(),
        path: display_path(global),
    })?;
    let url = parse_url(raw)?;

    match kind {
        Kind::PiHole => Ok(DeviceConfig::PiHole(PiHoleConfig::new(url))),
        Kind::AudioStation => {
            let username = global.username.clone().ok_or_else(|| missing("username"))?;
            let password = global
                .password
                .clone()
                .map(SecretString::from)
                .ok_or_else(|| missing("password"))?;
            // Only player-scoped commands need a name; they check for it.
            let player = global.player.clone().unwrap_or_default();
            Ok(DeviceConfig::AudioStation(AudioStationConfig::new(
                url, username, password, player,
            )))
        }
    }
}

fn apply_overrides(config: &mut DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let url = global.url.as_deref().map(parse_url).transpose()?;
    let timeout = match global.timeout {
        Some(0) => {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };
    let tls = if let Some(ref path) = global.ca_cert {
        Some(TlsVerification::CustomCa(path.clone()))
    } else if global.strict_tls {
        Some(TlsVerification::SystemDefaults)
    } else {
        None
    };

    let (url_slot, tls_slot, schedule) = match config {
        DeviceConfig::PiHole(c) => {
            if let Some(ref token) = global.token {
                c.token = Some(SecretString::from(token.clone()));
            }
            (&mut c.url, &mut c.tls, &mut c.schedule)
        }
        DeviceConfig::AudioStation(c) => (&mut c.url, &mut c.tls, &mut c.schedule),
    };
    if let Some(url) = url {
        *url_slot = url;
    }
    if let Some(tls) = tls {
        *tls_slot = tls;
    }
    if let Some(timeout) = timeout {
        schedule.timeout = timeout;
    }
    Ok(())
}

pub fn missing(what: &str) -> CliError {
    CliError::NoCredentials {
        what: what.into(),
        env: what.to_uppercase(),
    }
}

fn wrong_kind(name: String, actual: Kind, expected: Kind) -> CliError {
    CliError::WrongKind {
        name,
        actual: actual.name().into(),
        expected: expected.name().into(),
    }
}
