//! Runtime configuration.

use clap::ValueEnum;

/// Where program output lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConsoleMode {
    /// One `tracing` event per line
    #[default]
    Tracing,
    /// Straight to the process's stdout and stderr
    Stdio,
}

/// Settings for a [`Runtime`](crate::Runtime).
///
/// # Examples
///
/// ```
/// use aot_runtime::{ConsoleMode, RuntimeConfig};
///
/// let config = RuntimeConfig::default()
///     .with_console(ConsoleMode::Stdio)
///     .with_log_filter("debug");
/// assert_eq!(config.console, ConsoleMode::Stdio);
/// assert_eq!(config.log_filter, "debug");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Output routing for the standard stream sinks
    pub console: ConsoleMode,
    /// `EnvFilter` directive installed by binaries embedding the runtime
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            console: ConsoleMode::Tracing,
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Sets the output routing.
    pub fn with_console(mut self, console: ConsoleMode) -> Self {
        self.console = console;
        self
    }

    /// Sets the log filter directive.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}
