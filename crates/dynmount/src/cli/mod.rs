//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use dynmount_common::DynmountPaths;
use dynmount_oci::ContainerState;

use crate::config::DynmountConfig;
use crate::executor::MountExecutor;
use crate::hook::DynamicMounts;

/// Dynmount - bind mount host paths into containers at creation time
#[derive(Parser)]
#[command(name = "dynmount")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        env = "DYNMOUNT_LOG_FORMAT",
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Hook commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run as an OCI createContainer hook (reads container state on stdin)
    CreateContainer {
        /// Mount configuration file (default: $DYNMOUNT_CONFIG or /etc/dynmount/mounts.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Container rootfs on the host; skips reading state from stdin
        #[arg(long)]
        rootfs: Option<PathBuf>,
    },

    /// Check a mount configuration without mounting anything
    Validate {
        /// Mount configuration file (default: $DYNMOUNT_CONFIG or /etc/dynmount/mounts.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn config_paths(config: Option<PathBuf>) -> DynmountPaths {
    config.map_or_else(DynmountPaths::new, DynmountPaths::with_config)
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any mount fails.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::CreateContainer { config, rootfs } => {
                let paths = config_paths(config);
                let config = DynmountConfig::load(&paths.config)?;
                config.validate()?;

                let mounts = match rootfs {
                    Some(rootfs) => DynamicMounts::new(rootfs, config.mount_properties()),
                    None => {
                        let state = ContainerState::from_reader(std::io::stdin().lock())?;
                        DynamicMounts::from_state(&state, &config)?
                    }
                };

                mounts.create_container(&MountExecutor::new())?;
                Ok(())
            }

            Commands::Validate { config } => {
                let paths = config_paths(config);
                let config = DynmountConfig::load(&paths.config)?;
                config.validate()?;

                println!(
                    "{}: {} dynamic mount(s) OK",
                    paths.config.display(),
                    config.dynamic.len()
                );
                for entry in &config.dynamic {
                    println!(
                        "  {} -> {}{}",
                        entry.source.display(),
                        entry.destination.display(),
                        entry
                            .owner
                            .as_ref()
                            .map(|owner| format!(" (owner {owner})"))
                            .unwrap_or_default()
                    );
                }
                Ok(())
            }
        }
    }
}
