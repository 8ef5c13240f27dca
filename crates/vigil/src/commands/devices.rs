//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use vigil_core::{ArmAction, ArmState, Console, Device, Mutation, MutationOutcome};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{paint_state, print_output, render_list};

pub async fn handle(
    console: &Console,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List {
            building,
            search,
            all,
        } => list(console, building, search, all, global).await,

        DevicesCommand::Toggle {
            building,
            device_id,
        } => {
            console.open_building(building).await?;
            let outcome = console
                .execute(Mutation::Toggle {
                    building_id: building,
                    device_id,
                })
                .await?;
            report_outcome(console, building, &outcome, global);
            Ok(())
        }

        DevicesCommand::Arm { building, devices } => {
            bulk(console, building, devices, ArmAction::Arm, global).await
        }

        DevicesCommand::Disarm { building, devices } => {
            bulk(console, building, devices, ArmAction::Disarm, global).await
        }

        DevicesCommand::Ignore {
            building,
            device_id,
            on_arm,
            on_disarm,
        } => {
            console.open_building(building).await?;
            console
                .execute(Mutation::IgnoreEdit {
                    building_id: building,
                    device_id,
                    ignore_on_arm: on_arm,
                    ignore_on_disarm: on_disarm,
                })
                .await?;
            if !global.quiet {
                eprintln!("Ignore settings updated for device {device_id}");
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct DeviceEntry {
    id: u64,
    name: String,
    state: ArmState,
    ignored_on_arm: bool,
    ignored_on_disarm: bool,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "IGNORE ARM")]
    ignored_on_arm: bool,
    #[tabled(rename = "IGNORE DISARM")]
    ignored_on_disarm: bool,
}

fn entry(device: &Device) -> DeviceEntry {
    DeviceEntry {
        id: device.id,
        name: device.name.clone(),
        state: device.state,
        ignored_on_arm: device.ignored_on_arm,
        ignored_on_disarm: device.ignored_on_disarm,
    }
}

async fn list(
    console: &Console,
    building: u64,
    search: Option<String>,
    all: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    console.open_building(building).await?;
    if let Some(query) = search.as_deref() {
        console.search_devices(building, query).await?;
    }
    if all {
        while console.has_more_devices(building) {
            console.load_more(building).await?;
        }
    }

    let devices = console.devices(building);
    let entries: Vec<DeviceEntry> = devices.iter().map(|d| entry(d)).collect();

    let rendered = render_list(
        &global.output,
        &entries,
        |e| DeviceRow {
            id: e.id,
            name: e.name.clone(),
            state: paint_state(e.state),
            ignored_on_arm: e.ignored_on_arm,
            ignored_on_disarm: e.ignored_on_disarm,
        },
        |e| e.id.to_string(),
    );
    print_output(&rendered, global.quiet);

    if !global.quiet && console.has_more_devices(building) {
        eprintln!("(more devices exist; pass --all to fetch every page)");
    }
    Ok(())
}

async fn bulk(
    console: &Console,
    building: u64,
    devices: Option<Vec<u64>>,
    action: ArmAction,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    console.open_building(building).await?;
    let outcome = console
        .execute(Mutation::BulkAction {
            building_id: building,
            targets: devices,
            action,
        })
        .await?;
    report_outcome(console, building, &outcome, global);
    Ok(())
}

fn report_outcome(
    console: &Console,
    building: u64,
    outcome: &MutationOutcome,
    global: &GlobalOpts,
) {
    if global.quiet {
        return;
    }
    match outcome {
        MutationOutcome::Confirmed => {
            eprintln!(
                "Done. Building {building} is now: {}",
                console.building_status(building)
            );
        }
        MutationOutcome::Partial {
            success_count,
            failure_count,
            failures,
        } => {
            eprintln!("{success_count} succeeded, {failure_count} failed:");
            for failure in failures {
                eprintln!("  device {}: {}", failure.device_id, failure.message);
            }
        }
    }
}
