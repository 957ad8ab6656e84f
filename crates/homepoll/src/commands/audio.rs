//! Audio Station command handlers.
//!
//! Every command opens its own DSM session and logs out before returning,
//! whether or not the command itself succeeded.

use homepoll_api::{PlayerAction, PlayerStatus, RemotePlayer};
use homepoll_core::{AudioStationConfig, AudioStationDevice, PolledDevice};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{AudioArgs, AudioCommand, ControlAction, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PlayerRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    player_type: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&RemotePlayer> for PlayerRow {
    fn from(p: &RemotePlayer) -> Self {
        Self {
            name: p.name.clone(),
            player_type: p.player_type.clone().unwrap_or_default(),
            id: p.id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Ack {
    player: String,
    action: String,
}

pub async fn handle(args: AudioArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (name, cfg) = config::audio_station(global)?;
    tracing::debug!(device = %name, url = %cfg.url, "audio command");

    if let AudioCommand::Ping = args.command {
        return ping(&cfg, global).await;
    }

    let mut device = AudioStationDevice::new(&cfg)?;
    let result = match args.command {
        AudioCommand::Players => players(&mut device, global).await,
        cmd => {
            require_player(&cfg)?;
            with_player(&mut device, &cfg, cmd, global).await
        }
    };
    device.shutdown().await;
    result
}

async fn ping(cfg: &AudioStationConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let device = AudioStationDevice::new(cfg)?;
    if !device.client().check_connectivity().await {
        return Err(CliError::Unreachable {
            reason: format!("{} did not answer with HTTP 200", cfg.url),
        });
    }
    output::print_ok(
        &format!("{} is reachable", cfg.url),
        output::should_color(global.color),
        global.quiet,
    );
    Ok(())
}

async fn players(device: &mut AudioStationDevice, global: &GlobalOpts) -> Result<(), CliError> {
    device.login().await?;
    let players = device.client().list_players().await?;
    let out = output::render_list(
        global.output,
        &players,
        |p| PlayerRow::from(p),
        |p| p.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn with_player(
    device: &mut AudioStationDevice,
    cfg: &AudioStationConfig,
    cmd: AudioCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    device.connect().await?;

    match cmd {
        AudioCommand::Status => {
            let status = device.client().fetch_status().await?;
            let out = output::render_single(global.output, &status, detail, |s| s.state.clone());
            output::print_output(&out, global.quiet);
        }
        AudioCommand::Control { action } => {
            let action = player_action(action);
            device.client().try_send_control(action).await?;
            print_ack(global, cfg, action.to_string());
        }
        AudioCommand::Volume { percent } => {
            device.client().try_set_volume(percent).await?;
            print_ack(global, cfg, format!("volume {percent}"));
        }
        AudioCommand::Players | AudioCommand::Ping => {}
    }
    Ok(())
}

fn require_player(cfg: &AudioStationConfig) -> Result<(), CliError> {
    if cfg.player.is_empty() {
        return Err(CliError::Validation {
            field: "player".into(),
            reason: "pass --player or set HOMEPOLL_PLAYER".into(),
        });
    }
    Ok(())
}

fn player_action(action: ControlAction) -> PlayerAction {
    match action {
        ControlAction::Play => PlayerAction::Play,
        ControlAction::Pause => PlayerAction::Pause,
        ControlAction::Stop => PlayerAction::Stop,
        ControlAction::Next => PlayerAction::Next,
        ControlAction::Prev => PlayerAction::Prev,
    }
}

fn detail(s: &PlayerStatus) -> String {
    output::render_fields([
        ("state", s.state.clone()),
        ("volume", s.volume.to_string()),
        ("title", s.title().to_owned()),
        ("artist", s.artist().to_owned()),
        ("album", s.album().to_owned()),
        ("album_artist", s.album_artist().to_owned()),
    ])
}

fn print_ack(global: &GlobalOpts, cfg: &AudioStationConfig, action: String) {
    let ack = Ack {
        player: cfg.player.clone(),
        action,
    };
    let out = output::render_single(
        global.output,
        &ack,
        |a| format!("Sent {} to {}", a.action, a.player),
        |a| a.action.clone(),
    );
    output::print_output(&out, global.quiet);
}
