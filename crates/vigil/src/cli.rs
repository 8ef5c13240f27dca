//! Clap derive structures for the `vigil` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vigil -- command-line console for the alarm panel service
#[derive(Debug, Parser)]
#[command(
    name = "vigil",
    version,
    about = "Arm, disarm, and schedule buildings from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Panel service URL (overrides config file)
    #[arg(long, short = 's', env = "VIGIL_SERVER_URL", global = true)]
    pub server: Option<String>,

    /// Explicit config file path
    #[arg(long, env = "VIGIL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VIGIL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config file)
    #[arg(long, env = "VIGIL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and schedule buildings
    #[command(alias = "b")]
    Buildings(BuildingsArgs),

    /// List and control devices within a building
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Inspect or toggle the session-wide panel flag
    #[command(alias = "p")]
    Panel(PanelArgs),
}

// ── Buildings ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BuildingsArgs {
    #[command(subcommand)]
    pub command: BuildingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BuildingsCommand {
    /// List buildings with schedules and aggregate status
    List {
        /// Filter by case-insensitive substring on name (client-side)
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Also load each building's devices to derive its status
        #[arg(long)]
        status: bool,
    },

    /// Save a building's arm/disarm schedule
    Schedule {
        /// Building ID
        building_id: u64,

        /// Window start time (HH:MM), window-shaped deployments
        #[arg(long)]
        start: Option<String>,

        /// Window end time (HH:MM), window-shaped deployments
        #[arg(long)]
        end: Option<String>,

        /// Single daily time (HH:MM), daily-shaped deployments
        #[arg(long)]
        time: Option<String>,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List a building's devices (first page, or all with --all)
    List {
        /// Building ID
        #[arg(long, short = 'b')]
        building: u64,

        /// Server-side search on device name
        #[arg(long)]
        search: Option<String>,

        /// Follow pagination until the list is exhausted
        #[arg(long)]
        all: bool,
    },

    /// Toggle one device to the inverse of its current state
    Toggle {
        /// Building ID
        #[arg(long, short = 'b')]
        building: u64,

        /// Device ID
        device_id: u64,
    },

    /// Arm devices (whole building, or an explicit set)
    Arm {
        /// Building ID
        #[arg(long, short = 'b')]
        building: u64,

        /// Explicit device IDs (defaults to the whole building)
        #[arg(long, value_delimiter = ',')]
        devices: Option<Vec<u64>>,
    },

    /// Disarm devices (whole building, or an explicit set)
    Disarm {
        /// Building ID
        #[arg(long, short = 'b')]
        building: u64,

        /// Explicit device IDs (defaults to the whole building)
        #[arg(long, value_delimiter = ',')]
        devices: Option<Vec<u64>>,
    },

    /// Edit a device's ignore flags
    Ignore {
        /// Building ID
        #[arg(long, short = 'b')]
        building: u64,

        /// Device ID
        device_id: u64,

        /// Exclude the device from bulk arms
        #[arg(long)]
        on_arm: bool,

        /// Exclude the device from bulk disarms
        #[arg(long)]
        on_disarm: bool,
    },
}

// ── Panel ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PanelArgs {
    #[command(subcommand)]
    pub command: PanelCommand,
}

#[derive(Debug, Subcommand)]
pub enum PanelCommand {
    /// Show the panel's armed flag
    Status,

    /// Flip the panel's armed flag
    Toggle,
}
