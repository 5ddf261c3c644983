//! Command-line arguments of the demo binary.

use crate::config::{ConsoleMode, RuntimeConfig};
use clap::Parser;

/// Runs a small compiled program that sleeps, dispatches virtually and
/// prints through the runtime's sinks.
#[derive(Debug, Parser)]
#[command(name = "aotrt-demo", version, about)]
pub struct Cli {
    /// Log filter directive, e.g. `info` or `continuation=trace`
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,

    /// Where program output goes
    #[arg(short, long, value_enum, default_value_t = ConsoleMode::Stdio)]
    pub console: ConsoleMode,

    /// Number of ticks the program prints
    #[arg(short = 'n', long, default_value_t = 3)]
    pub iterations: u32,

    /// Virtual milliseconds slept between ticks
    #[arg(short, long, default_value_t = 100)]
    pub delay_ms: u64,

    /// Arguments handed to the program's main
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Runtime configuration selected by the arguments
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::default()
            .with_console(self.console)
            .with_log_filter(self.log_level.clone())
    }
}
