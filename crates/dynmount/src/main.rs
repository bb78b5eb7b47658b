//! Dynmount CLI entry point.

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dynmount::cli::{Cli, LogFormat};

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.log_format, cli.debug)?;

    // Execute command
    cli.execute()
}

/// Log to stderr; stdout belongs to the runtime.
///
/// `RUST_LOG` wins over the `dynmount=info` default; `--debug` overrides both.
fn init_tracing(format: LogFormat, debug: bool) -> Result<()> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dynmount=info"));
    if debug {
        filter = filter.add_directive("dynmount=debug".parse()?);
    }

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }

    Ok(())
}
