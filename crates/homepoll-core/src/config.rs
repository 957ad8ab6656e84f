// ── Runtime device configuration ──
//
// These types describe *how* to reach one device and how often to poll it.
// They carry credential data and timing, but never touch disk. The CLI
// resolves a config file into a `DeviceConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use homepoll_api::{SummaryFormat, TlsMode, TransportConfig};

/// Default Pi-hole poll schedule.
pub const PIHOLE_INITIAL_DELAY: Duration = Duration::from_secs(15);
/// Default Audio Station poll schedule.
pub const AUDIO_STATION_INITIAL_DELAY: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for LAN appliances.
    #[default]
    DangerAcceptInvalid,
}

/// Poll timing shared by every device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Wait before the first poll.
    pub initial_delay: Duration,
    /// Pause between the end of one poll and the start of the next.
    pub interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Schedule {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Connection settings for a Pi-hole.
#[derive(Debug, Clone)]
pub struct PiHoleConfig {
    /// Admin root, e.g. `http://pi.hole`.
    pub url: Url,
    /// API token; only needed for enable/disable.
    pub token: Option<SecretString>,
    pub summary_format: SummaryFormat,
    pub tls: TlsVerification,
    pub schedule: Schedule,
}

impl PiHoleConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            summary_format: SummaryFormat::default(),
            tls: TlsVerification::default(),
            schedule: Schedule::new(PIHOLE_INITIAL_DELAY, Duration::from_secs(60)),
        }
    }
}

/// Connection settings for one Audio Station remote player.
#[derive(Debug, Clone)]
pub struct AudioStationConfig {
    /// DSM root, e.g. `http://nas.local:5000`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Remote player to drive, matched exactly by name.
    pub player: String,
    pub tls: TlsVerification,
    pub schedule: Schedule,
}

impl AudioStationConfig {
    pub fn new(url: Url, username: String, password: SecretString, player: String) -> Self {
        Self {
            url,
            username,
            password,
            player,
            tls: TlsVerification::default(),
            schedule: Schedule::new(AUDIO_STATION_INITIAL_DELAY, Duration::from_secs(60)),
        }
    }
}

/// One configured device.
#[derive(Debug, Clone)]
pub enum DeviceConfig {
    PiHole(PiHoleConfig),
    AudioStation(AudioStationConfig),
}

impl DeviceConfig {
    pub fn url(&self) -> &Url {
        match self {
            Self::PiHole(c) => &c.url,
            Self::AudioStation(c) => &c.url,
        }
    }

    pub fn schedule(&self) -> Schedule {
        match self {
            Self::PiHole(c) => c.schedule,
            Self::AudioStation(c) => c.schedule,
        }
    }
}

pub(crate) fn build_transport(tls: &TlsVerification, timeout: Duration) -> TransportConfig {
    TransportConfig {
        tls: match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout,
    }
}
