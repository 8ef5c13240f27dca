//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, JSON uses serde, plain emits one identifier per
//! line for scripting.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use vigil_core::{AggregateStatus, ArmState};

use crate::cli::OutputFormat;

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("<serialize error: {e}>"))
        }
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Colorize an arm state for table cells.
pub fn paint_state(state: ArmState) -> String {
    match state {
        ArmState::Armed => state.to_string().red().to_string(),
        ArmState::Disarmed => state.to_string().green().to_string(),
        ArmState::Unknown => state.to_string().dimmed().to_string(),
    }
}

/// Colorize an aggregate status for table cells.
pub fn paint_status(status: AggregateStatus) -> String {
    match status {
        AggregateStatus::AllArmed => status.to_string().red().to_string(),
        AggregateStatus::PartiallyArmed => status.to_string().yellow().to_string(),
        AggregateStatus::AllDisarmed => status.to_string().green().to_string(),
        AggregateStatus::Empty => status.to_string().dimmed().to_string(),
    }
}
