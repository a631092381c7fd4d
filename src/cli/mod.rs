//! Command-line interface for ecmsync.

pub mod args;
mod commands;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app::{App, AppError};
use crate::sync::SyncError;

pub use args::{GlobalArgs, OutputSink};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    /// App error.
    #[error("{0}")]
    App(#[from] AppError),

    /// Sync flow error.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// ecmsync - sync ECM forms and global events with a local workspace.
#[derive(Parser, Debug)]
#[command(name = "ecms", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Form operations.
    Form {
        #[command(subcommand)]
        command: commands::form::FormCommand,
    },

    /// Global event operations.
    Event {
        #[command(subcommand)]
        command: commands::event::EventCommand,
    },

    /// Server profile operations.
    Server {
        #[command(subcommand)]
        command: commands::server::ServerCommand,
    },
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        // Create the App from global arguments
        let app = App::new(self.global.to_app_context())?;

        match self.command {
            Command::Form { command } => {
                command.run(&app, &self.global).await?;
            }
            Command::Event { command } => {
                command.run(&app, &self.global).await?;
            }
            Command::Server { command } => {
                command.run(&app, &self.global).await?;
            }
        }

        Ok(())
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}
