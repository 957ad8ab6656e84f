// Audio Station web API response types
//
// Every response is wrapped in `{ "success": bool, "data": {...} }`.
// Failed calls carry `{ "success": false, "error": { "code": N } }`.

use serde::{Deserialize, Serialize};

use crate::snapshot::SummarySnapshot;

// ── Response Envelope ────────────────────────────────────────────────

/// Loosely typed envelope; `data` is decoded separately once `success`
/// has been checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub sid: String,
}

// ── Remote players ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct PlayerList {
    pub players: Vec<RemotePlayer>,
}

/// One entry of `remote_player.cgi?method=list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlayer {
    pub id: String,
    pub name: String,
    /// `"upnp"`, `"airplay"`, `"chromecast"`, ...
    #[serde(default, rename = "type")]
    pub player_type: Option<String>,
}

/// Transport action accepted by `method=control`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "lowercase")]
pub enum PlayerAction {
    Play,
    Pause,
    Stop,
    Next,
    Prev,
}

// ── Status ───────────────────────────────────────────────────────────

/// Validated `method=getstatus&additional=song_tag` payload.
///
/// `state` and `volume` are required. `song` is absent while the player
/// is idle; the track fields then read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// `"playing"`, `"pause"`, `"stopped"`, ...
    pub state: String,
    pub volume: u32,
    #[serde(default)]
    pub song: Option<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub additional: Option<SongAdditional>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongAdditional {
    #[serde(default)]
    pub song_tag: Option<SongTag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongTag {
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub album_artist: String,
    #[serde(default)]
    pub artist: String,
}

/// Coarse playback state for a play/pause switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Playback {
    Playing,
    Paused,
}

impl PlayerStatus {
    pub fn title(&self) -> &str {
        self.song.as_ref().map_or("", |s| s.title.as_str())
    }

    pub fn album(&self) -> &str {
        self.tag().map_or("", |t| t.album.as_str())
    }

    pub fn album_artist(&self) -> &str {
        self.tag().map_or("", |t| t.album_artist.as_str())
    }

    pub fn artist(&self) -> &str {
        self.tag().map_or("", |t| t.artist.as_str())
    }

    /// `playing` is playing; `pause` and `stopped` both read as paused.
    /// Any other state (e.g. `"transitioning"`) is `None`.
    pub fn playback(&self) -> Option<Playback> {
        match self.state.as_str() {
            "playing" => Some(Playback::Playing),
            "pause" | "stopped" => Some(Playback::Paused),
            _ => None,
        }
    }

    pub fn to_snapshot(&self) -> SummarySnapshot {
        SummarySnapshot::from_pairs([
            ("state", self.state.clone()),
            ("volume", self.volume.to_string()),
            ("album", self.album().to_owned()),
            ("album_artist", self.album_artist().to_owned()),
            ("artist", self.artist().to_owned()),
            ("title", self.title().to_owned()),
        ])
    }

    fn tag(&self) -> Option<&SongTag> {
        self.song
            .as_ref()
            .and_then(|s| s.additional.as_ref())
            .and_then(|a| a.song_tag.as_ref())
    }
}
