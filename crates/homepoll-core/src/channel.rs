// ── Channel model ──
//
// Channels are the named points where device state is published and
// commands arrive. Each device kind exposes a fixed subset of them.

use std::fmt;

use serde::Serialize;

pub use homepoll_api::Playback;

/// Every channel any device can expose.
///
/// Names are the snake_case identifiers used on the wire and in the CLI.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    // ── Pi-hole ──────────────────────────────────────────────────────
    Status,
    Enabled,
    DnsQueriesToday,
    DomainsBeingBlocked,
    AdsBlockedToday,
    AdsPercentageToday,
    UniqueDomains,
    QueriesForwarded,
    QueriesCached,
    ClientsEverSeen,
    UniqueClients,
    PrivacyLevel,

    // ── Audio Station ────────────────────────────────────────────────
    State,
    Player,
    Volume,
    Album,
    AlbumArtist,
    Artist,
    Title,
    Control,
    SetVolume,
}

/// Channels published by a Pi-hole, in publish order.
pub const PIHOLE_CHANNELS: &[Channel] = &[
    Channel::Status,
    Channel::Enabled,
    Channel::DnsQueriesToday,
    Channel::DomainsBeingBlocked,
    Channel::AdsBlockedToday,
    Channel::AdsPercentageToday,
    Channel::UniqueDomains,
    Channel::QueriesForwarded,
    Channel::QueriesCached,
    Channel::ClientsEverSeen,
    Channel::UniqueClients,
    Channel::PrivacyLevel,
];

/// Channels of an Audio Station remote player.
pub const AUDIO_STATION_CHANNELS: &[Channel] = &[
    Channel::State,
    Channel::Player,
    Channel::Volume,
    Channel::Album,
    Channel::AlbumArtist,
    Channel::Artist,
    Channel::Title,
    Channel::Control,
    Channel::SetVolume,
];

/// Skip direction for the player channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Skip {
    Next,
    Previous,
}

/// A command delivered to a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Re-fetch and republish now.
    Refresh,
    OnOff(bool),
    PlayPause(Playback),
    NextPrevious(Skip),
    Text(String),
    Decimal(f64),
}

impl Command {
    /// Parse a command the way a text bus would deliver it.
    ///
    /// `REFRESH`, `ON`/`OFF`, `PLAY`/`PAUSE`, `NEXT`/`PREVIOUS` are
    /// keywords; anything numeric is a decimal; the rest is text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "REFRESH" => Self::Refresh,
            "ON" => Self::OnOff(true),
            "OFF" => Self::OnOff(false),
            "PLAY" => Self::PlayPause(Playback::Playing),
            "PAUSE" => Self::PlayPause(Playback::Paused),
            "NEXT" => Self::NextPrevious(Skip::Next),
            "PREVIOUS" => Self::NextPrevious(Skip::Previous),
            _ => trimmed
                .parse::<f64>()
                .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Decimal),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh => f.write_str("REFRESH"),
            Self::OnOff(true) => f.write_str("ON"),
            Self::OnOff(false) => f.write_str("OFF"),
            Self::PlayPause(Playback::Playing) => f.write_str("PLAY"),
            Self::PlayPause(Playback::Paused) => f.write_str("PAUSE"),
            Self::NextPrevious(skip) => write!(f, "{skip}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Decimal(value) => write!(f, "{value}"),
        }
    }
}

/// Value published on a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChannelState {
    Text(String),
    Number(f64),
    Percent(u32),
    Switch(bool),
    PlayPause(Playback),
    /// The device reported something the channel cannot represent.
    Undef,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
            Self::Percent(value) => write!(f, "{value}%"),
            Self::Switch(true) => f.write_str("ON"),
            Self::Switch(false) => f.write_str("OFF"),
            Self::PlayPause(Playback::Playing) => f.write_str("PLAY"),
            Self::PlayPause(Playback::Paused) => f.write_str("PAUSE"),
            Self::Undef => f.write_str("UNDEF"),
        }
    }
}

/// Reachability of a device as seen by its handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceStatus {
    Unknown,
    Online,
    Offline { reason: String },
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("UNKNOWN"),
            Self::Online => f.write_str("ONLINE"),
            Self::Offline { reason } => write!(f, "OFFLINE ({reason})"),
        }
    }
}
