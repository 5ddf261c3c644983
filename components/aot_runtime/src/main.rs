//! Demo runner for the AOT runtime.
//!
//! Loads a small compiled program, starts its main thread and drives the
//! event loop until the program finishes.

use aot_runtime::demo::DemoProgram;
use aot_runtime::{Cli, Runtime};
use clap::Parser as ClapParser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.runtime_config();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runtime = Runtime::new(config)?;
    let program = DemoProgram::new(cli.iterations, cli.delay_ms);
    program.load(&runtime)?;

    let args: Vec<&str> = cli.args.iter().map(String::as_str).collect();
    let thread = program.start(&runtime, &args)?;

    if let Err(e) = runtime.run_event_loop() {
        error!(error = %e, "program failed");
        std::process::exit(1);
    }

    info!(
        status = %thread.status(),
        virtual_ms = runtime.event_loop().now(),
        "program finished"
    );
    Ok(())
}
