// homepoll-api: Async Rust clients for the Pi-hole admin API and the
// Synology Audio Station remote player API.

pub mod audio_station;
pub mod error;
pub mod pihole;
pub mod snapshot;
pub mod transport;

pub use audio_station::{
    AudioStationClient, Playback, PlayerAction, PlayerStatus, RemotePlayer, Session, SessionState,
};
pub use error::{Error, ErrorKind};
pub use pihole::{PiHoleClient, PiHoleSummary, SummaryFormat};
pub use snapshot::SummarySnapshot;
pub use transport::{DeviceEndpoint, TlsMode, TransportConfig};
