// homepoll-core: Polling orchestrator between the device clients and a
// state/command bus.

pub mod channel;
pub mod config;
pub mod device;
pub mod error;
pub mod handler;
pub mod sink;

// ── Primary re-exports ──────────────────────────────────────────────
pub use channel::{
    AUDIO_STATION_CHANNELS, Channel, ChannelState, Command, DeviceStatus, PIHOLE_CHANNELS,
    Playback, Skip,
};
pub use config::{AudioStationConfig, DeviceConfig, PiHoleConfig, Schedule, TlsVerification};
pub use device::{AudioStationDevice, PiHoleDevice, PolledDevice, Updates};
pub use error::CoreError;
pub use handler::Handler;
pub use sink::{ChannelSink, SinkEvent, StateSink};
