// Synology Audio Station client
//
// Session-based: login -> sid, remote player lookup by name, then
// player-scoped control, volume, and status calls. Every response is
// wrapped in the `{ success, data }` envelope.

pub mod auth;
pub mod client;
pub mod models;
pub mod player;

pub use client::{AudioStationClient, Session, SessionState};
pub use models::{Playback, PlayerAction, PlayerStatus, RemotePlayer};
