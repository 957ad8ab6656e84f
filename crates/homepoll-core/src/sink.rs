// ── State sink ──
//
// The publishing half of the command bus. Handlers push channel states and
// device status here; what happens next (printing, forwarding, storing) is
// up to the host.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::channel::{Channel, ChannelState, DeviceStatus};

/// Receiver of everything a handler publishes.
///
/// Methods are synchronous and must not block: handlers call them while
/// holding the device lock.
pub trait StateSink: Send + Sync + 'static {
    fn publish(&self, device: &str, channel: Channel, state: ChannelState);

    fn set_status(&self, device: &str, status: DeviceStatus);
}

/// One publication, as delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    State {
        device: String,
        channel: Channel,
        state: ChannelState,
    },
    Status {
        device: String,
        status: DeviceStatus,
    },
}

impl SinkEvent {
    pub fn device(&self) -> &str {
        match self {
            Self::State { device, .. } | Self::Status { device, .. } => device,
        }
    }
}

/// [`StateSink`] that forwards every publication into an mpsc channel.
///
/// Publications made after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StateSink for ChannelSink {
    fn publish(&self, device: &str, channel: Channel, state: ChannelState) {
        let _ = self.tx.send(SinkEvent::State {
            device: device.to_owned(),
            channel,
            state,
        });
    }

    fn set_status(&self, device: &str, status: DeviceStatus) {
        let _ = self.tx.send(SinkEvent::Status {
            device: device.to_owned(),
            status,
        });
    }
}
