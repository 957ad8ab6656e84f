// Audio Station remote player endpoints
//
// `SYNO.AudioStation.RemotePlayer` v2: list, control, getstatus. All of
// them are session-scoped; control and getstatus also need a resolved
// player id.

use serde::de::IgnoredAny;
use tracing::{debug, info, warn};

use crate::audio_station::client::AudioStationClient;
use crate::audio_station::models::{PlayerAction, PlayerList, PlayerStatus, RemotePlayer};
use crate::error::Error;
use crate::snapshot::SummarySnapshot;

impl AudioStationClient {
    /// List the remote players known to Audio Station.
    ///
    /// `GET .../remote_player.cgi?...&method=list&_sid={sid}`
    pub async fn list_players(&self) -> Result<Vec<RemotePlayer>, Error> {
        let url = self.player_url("list", None, &[])?;
        let list: PlayerList = self.call(url).await?;
        debug!(count = list.players.len(), "listed remote players");
        Ok(list.players)
    }

    /// Look up a player by exact (case-sensitive) name and remember its id.
    ///
    /// The first match wins. When no player matches, the previously
    /// resolved player (if any) is kept.
    pub async fn resolve_player(&mut self, name: &str) -> Result<String, Error> {
        let players = self.list_players().await?;
        let player = players
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::PlayerNotFound {
                name: name.to_owned(),
            })?;

        info!(name, id = %player.id, "resolved remote player");
        self.session.set_player(player.id.clone(), name.to_owned());
        Ok(player.id)
    }

    /// Send a transport action to the resolved player.
    ///
    /// `GET .../remote_player.cgi?...&method=control&_sid={sid}&id={player}&action={action}`
    pub async fn try_send_control(&self, action: PlayerAction) -> Result<(), Error> {
        let player = self.require_player()?;
        let url = self.player_url("control", Some(player), &[("action", action.as_ref())])?;
        let _: IgnoredAny = self.call(url).await?;
        debug!(%action, "control sent");
        Ok(())
    }

    /// Fire-and-forget form of [`try_send_control`](Self::try_send_control):
    /// failures are logged and dropped.
    pub async fn send_control(&self, action: PlayerAction) {
        if let Err(e) = self.try_send_control(action).await {
            warn!(error = %e, %action, "failed to send control command");
        }
    }

    /// Set the player volume in percent.
    ///
    /// `GET .../remote_player.cgi?...&method=control&_sid={sid}&id={player}&action=set_volume&value={percent}`
    ///
    /// Values above 100 are rejected before any request is sent.
    pub async fn try_set_volume(&self, percent: u32) -> Result<(), Error> {
        if percent > 100 {
            return Err(Error::VolumeOutOfRange { value: percent });
        }
        let player = self.require_player()?;
        let value = percent.to_string();
        let url = self.player_url(
            "control",
            Some(player),
            &[("action", "set_volume"), ("value", &value)],
        )?;
        let _: IgnoredAny = self.call(url).await?;
        debug!(percent, "volume set");
        Ok(())
    }

    /// Fire-and-forget form of [`try_set_volume`](Self::try_set_volume).
    pub async fn set_volume(&self, percent: u32) {
        if let Err(e) = self.try_set_volume(percent).await {
            warn!(error = %e, percent, "failed to set volume");
        }
    }

    /// Fetch playback state, volume, and track metadata.
    ///
    /// `GET .../remote_player.cgi?...&method=getstatus&_sid={sid}&id={player}&additional=song_tag`
    pub async fn fetch_status(&self) -> Result<PlayerStatus, Error> {
        let player = self.require_player()?;
        let url = self.player_url("getstatus", Some(player), &[("additional", "song_tag")])?;
        let status: PlayerStatus = self.call(url).await?;
        debug!(state = %status.state, volume = status.volume, "fetched player status");
        Ok(status)
    }

    /// [`fetch_status`](Self::fetch_status) flattened into a snapshot.
    pub async fn fetch_snapshot(&self) -> Result<SummarySnapshot, Error> {
        Ok(self.fetch_status().await?.to_snapshot())
    }
}
