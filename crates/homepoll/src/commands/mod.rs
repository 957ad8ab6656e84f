//! Command dispatch: bridges CLI args -> device clients -> output formatting.

pub mod audio;
pub mod config_cmd;
pub mod pihole;
pub mod run;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Pihole(args) => pihole::handle(args, global).await,
        Command::Audio(args) => audio::handle(args, global).await,
        Command::Run(args) => run::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
