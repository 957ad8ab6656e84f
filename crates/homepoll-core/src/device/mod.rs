// ── Device adapters ──
//
// A device adapter owns one client and translates between it and the
// channel model: poll results become channel states, channel commands
// become client calls. The `Handler` drives adapters through this trait.

mod audio_station;
mod pihole;

use std::future::Future;

use crate::channel::{Channel, ChannelState, Command};
use crate::error::CoreError;

pub use audio_station::AudioStationDevice;
pub use pihole::PiHoleDevice;

/// Channel states produced by one poll or command.
pub type Updates = Vec<(Channel, ChannelState)>;

/// A device the [`Handler`](crate::Handler) can connect, poll, and command.
///
/// The handler serializes every call, so implementations may keep plain
/// mutable state.
pub trait PolledDevice: Send + 'static {
    /// Channels this device exposes. Commands for any other channel are
    /// rejected before reaching [`handle`](Self::handle).
    fn channels(&self) -> &'static [Channel];

    /// Establish whatever the device needs before polling: a liveness
    /// probe, and for session devices login plus player resolution.
    fn connect(&mut self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Fetch current state.
    fn poll(&mut self) -> impl Future<Output = Result<Updates, CoreError>> + Send;

    /// Execute a non-refresh command on one of [`channels`](Self::channels).
    ///
    /// Returns the states the command changed, if the device reports them.
    /// A command the channel does not accept yields
    /// [`CoreError::UnsupportedCommand`].
    fn handle(
        &mut self,
        channel: Channel,
        command: Command,
    ) -> impl Future<Output = Result<Updates, CoreError>> + Send;

    /// Release server-side resources. Best-effort.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}

pub(crate) fn unsupported(channel: Channel, command: &Command) -> CoreError {
    CoreError::UnsupportedCommand {
        channel: channel.to_string(),
        command: command.to_string(),
    }
}
