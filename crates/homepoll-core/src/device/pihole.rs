// Pi-hole adapter: summary polling plus the blocking switch.

use homepoll_api::PiHoleClient;
use homepoll_api::pihole::models::blocking_state;
use tracing::{debug, info};

use crate::channel::{Channel, ChannelState, Command, PIHOLE_CHANNELS};
use crate::config::{PiHoleConfig, build_transport};
use crate::device::{PolledDevice, Updates, unsupported};
use crate::error::CoreError;

pub struct PiHoleDevice {
    client: PiHoleClient,
}

impl PiHoleDevice {
    pub fn new(config: &PiHoleConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config.tls, config.schedule.timeout);
        let client = PiHoleClient::new(config.url.as_str(), config.token.clone(), &transport)?
            .with_summary_format(config.summary_format);
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: PiHoleClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PiHoleClient {
        &self.client
    }
}

/// `status` text plus the `enabled` switch derived from it.
fn status_updates(status: &str) -> Updates {
    let switch = blocking_state(status).map_or(ChannelState::Undef, ChannelState::Switch);
    vec![
        (Channel::Status, ChannelState::Text(status.to_owned())),
        (Channel::Enabled, switch),
    ]
}

fn counter_channel(field: &str) -> Option<Channel> {
    field.parse().ok()
}

impl PolledDevice for PiHoleDevice {
    fn channels(&self) -> &'static [Channel] {
        PIHOLE_CHANNELS
    }

    async fn connect(&mut self) -> Result<(), CoreError> {
        if self.client.check_connectivity().await {
            Ok(())
        } else {
            Err(CoreError::Unreachable {
                reason: "Cannot connect to server".into(),
            })
        }
    }

    async fn poll(&mut self) -> Result<Updates, CoreError> {
        let summary = self.client.fetch_summary().await?;

        let mut updates = status_updates(&summary.status);
        for (field, value) in summary.counters() {
            let Some(channel) = counter_channel(field) else {
                continue;
            };
            let state = value
                .parse::<f64>()
                .map_or(ChannelState::Undef, ChannelState::Number);
            updates.push((channel, state));
        }

        debug!(channels = updates.len(), "summary polled");
        Ok(updates)
    }

    async fn handle(&mut self, channel: Channel, command: Command) -> Result<Updates, CoreError> {
        match (channel, &command) {
            (Channel::Enabled, Command::OnOff(on)) => {
                info!(on, "switching Pi-hole blocking");
                let status = self.client.set_enabled(*on).await?;
                Ok(status_updates(&status))
            }
            _ => Err(unsupported(channel, &command)),
        }
    }

    async fn shutdown(&mut self) {}
}
