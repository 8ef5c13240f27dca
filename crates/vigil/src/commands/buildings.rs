//! Building command handlers.

use serde::Serialize;
use tabled::Tabled;

use vigil_core::{AggregateStatus, Console, Mutation, Schedule, ScheduleDraft};

use crate::cli::{BuildingsArgs, BuildingsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{paint_status, print_output, render_list};

use super::parse_time;

pub async fn handle(
    console: &Console,
    args: BuildingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BuildingsCommand::List { filter, status } => list(console, filter, status, global).await,

        BuildingsCommand::Schedule {
            building_id,
            start,
            end,
            time,
        } => {
            let draft = ScheduleDraft {
                start: start.as_deref().map(|s| parse_time(s, "--start")).transpose()?,
                end: end.as_deref().map(|s| parse_time(s, "--end")).transpose()?,
                time: time.as_deref().map(|s| parse_time(s, "--time")).transpose()?,
            };

            console
                .execute(Mutation::ScheduleEdit { building_id, draft })
                .await?;

            if !global.quiet {
                eprintln!("Schedule updated for building {building_id}");
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct BuildingEntry {
    id: u64,
    name: String,
    schedule: Schedule,
    status: Option<AggregateStatus>,
}

#[derive(Tabled)]
struct BuildingRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SCHEDULE")]
    schedule: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

async fn list(
    console: &Console,
    filter: Option<String>,
    with_status: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let buildings = match filter.as_deref() {
        Some(query) => console.filter_buildings(query),
        None => console.visible_buildings(),
    };

    let mut entries = Vec::with_capacity(buildings.len());
    for building in &buildings {
        let status = if with_status {
            console.open_building(building.id).await?;
            Some(console.building_status(building.id))
        } else {
            None
        };
        entries.push(BuildingEntry {
            id: building.id,
            name: building.name.clone(),
            schedule: building.schedule,
            status,
        });
    }

    let rendered = render_list(
        &global.output,
        &entries,
        |e| BuildingRow {
            id: e.id,
            name: e.name.clone(),
            schedule: format_schedule(&e.schedule),
            status: e.status.map_or_else(|| "-".to_owned(), paint_status),
        },
        |e| e.id.to_string(),
    );
    print_output(&rendered, global.quiet);
    Ok(())
}

fn format_schedule(schedule: &Schedule) -> String {
    match schedule {
        Schedule::Window { start, end } => {
            format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
        }
        Schedule::Daily { time } => format!("daily {}", time.format("%H:%M")),
    }
}
