//! Panel command handlers.

use vigil_core::{Console, Mutation};

use crate::cli::{GlobalOpts, PanelArgs, PanelCommand};
use crate::error::CliError;

pub async fn handle(
    console: &Console,
    args: PanelArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PanelCommand::Status => {
            let panel = console.panel().ok_or(CliError::Request {
                message: "panel status has not been loaded".into(),
            })?;
            println!("{}", if panel.armed { "armed" } else { "disarmed" });
            Ok(())
        }

        PanelCommand::Toggle => {
            console.execute(Mutation::PanelToggle).await?;
            if !global.quiet {
                let armed = console.panel().is_some_and(|p| p.armed);
                eprintln!("Panel is now {}", if armed { "armed" } else { "disarmed" });
            }
            Ok(())
        }
    }
}
