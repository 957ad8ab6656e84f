// Audio Station adapter: one remote player behind a DSM session.

use std::str::FromStr;

use homepoll_api::{AudioStationClient, Playback, PlayerAction, PlayerStatus};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::channel::{AUDIO_STATION_CHANNELS, Channel, ChannelState, Command, Skip};
use crate::config::{AudioStationConfig, build_transport};
use crate::device::{PolledDevice, Updates, unsupported};
use crate::error::CoreError;

pub struct AudioStationDevice {
    client: AudioStationClient,
    username: String,
    password: SecretString,
    player: String,
}

impl AudioStationDevice {
    pub fn new(config: &AudioStationConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config.tls, config.schedule.timeout);
        let client = AudioStationClient::new(config.url.as_str(), &transport)?;
        Ok(Self::from_client(
            client,
            config.username.clone(),
            config.password.clone(),
            config.player.clone(),
        ))
    }

    pub fn from_client(
        client: AudioStationClient,
        username: String,
        password: SecretString,
        player: String,
    ) -> Self {
        Self {
            client,
            username,
            password,
            player,
        }
    }

    pub fn client(&self) -> &AudioStationClient {
        &self.client
    }

    /// Open a DSM session without resolving the player.
    pub async fn login(&mut self) -> Result<(), CoreError> {
        self.client.login(&self.username, &self.password).await?;
        Ok(())
    }

    async fn set_volume(&self, value: f64) {
        if !(0.0..=100.0).contains(&value) {
            warn!(value, "ignoring volume outside 0-100");
            return;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
        let percent = value as u32;
        self.client.set_volume(percent).await;
    }
}

fn status_updates(status: &PlayerStatus) -> Updates {
    let player = status
        .playback()
        .map_or(ChannelState::Undef, ChannelState::PlayPause);
    vec![
        (Channel::State, ChannelState::Text(status.state.clone())),
        (Channel::Player, player),
        (Channel::Volume, ChannelState::Percent(status.volume.min(100))),
        (Channel::Album, ChannelState::Text(status.album().to_owned())),
        (
            Channel::AlbumArtist,
            ChannelState::Text(status.album_artist().to_owned()),
        ),
        (Channel::Artist, ChannelState::Text(status.artist().to_owned())),
        (Channel::Title, ChannelState::Text(status.title().to_owned())),
    ]
}

impl PolledDevice for AudioStationDevice {
    fn channels(&self) -> &'static [Channel] {
        AUDIO_STATION_CHANNELS
    }

    async fn connect(&mut self) -> Result<(), CoreError> {
        if !self.client.check_connectivity().await {
            return Err(CoreError::Unreachable {
                reason: "Cannot connect to server".into(),
            });
        }

        self.login().await?;
        let id = self.client.resolve_player(&self.player).await?;
        info!(player = %self.player, %id, "remote player ready");
        Ok(())
    }

    async fn poll(&mut self) -> Result<Updates, CoreError> {
        let status = self.client.fetch_status().await?;
        debug!(state = %status.state, "player polled");
        Ok(status_updates(&status))
    }

    async fn handle(&mut self, channel: Channel, command: Command) -> Result<Updates, CoreError> {
        match (channel, &command) {
            (Channel::Player, Command::PlayPause(Playback::Playing)) => {
                self.client.send_control(PlayerAction::Play).await;
            }
            (Channel::Player, Command::PlayPause(Playback::Paused)) => {
                self.client.send_control(PlayerAction::Pause).await;
            }
            (Channel::Player, Command::NextPrevious(Skip::Next)) => {
                self.client.send_control(PlayerAction::Next).await;
            }
            (Channel::Player, Command::NextPrevious(Skip::Previous)) => {
                self.client.send_control(PlayerAction::Prev).await;
            }
            (Channel::Control, Command::Text(text)) => {
                let action =
                    PlayerAction::from_str(text).map_err(|_| unsupported(channel, &command))?;
                self.client.send_control(action).await;
            }
            (Channel::SetVolume, Command::Decimal(value)) => {
                self.set_volume(*value).await;
            }
            _ => return Err(unsupported(channel, &command)),
        }
        Ok(Vec::new())
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }
    }
}
