//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "barpanel",
    version,
    about = "Operator panel for the drink-mixing machine"
)]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/barpanel.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the machine and run the interactive panel
    Run {
        /// Use a simulated backend instead of the configured server
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
        /// Skip the startup mixing-status resync
        #[arg(long, action = ArgAction::SetTrue)]
        no_resync: bool,
    },
    /// Print the current hose fill levels once and exit
    Hoses,
    /// Quick health check (backend reachable and answering)
    SelfCheck,
}
