//! Command dispatch: bridges CLI args -> core mutations -> output.

pub mod buildings;
pub mod devices;
pub mod panel;

use vigil_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a console-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Buildings(args) => buildings::handle(console, args, global).await,
        Command::Devices(args) => devices::handle(console, args, global).await,
        Command::Panel(args) => panel::handle(console, args, global).await,
    }
}

/// Parse an `HH:MM` CLI argument.
pub fn parse_time(raw: &str, flag: &str) -> Result<chrono::NaiveTime, CliError> {
    chrono::NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| CliError::Validation {
        message: format!("{flag} must be HH:MM, got '{raw}'"),
    })
}
