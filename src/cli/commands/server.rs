//! Server profile subcommands.

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::config::ServerProfile;

// =============================================================================
// Server Subcommands
// =============================================================================

/// Server profile subcommands.
#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    /// List the configured server profiles.
    List(ListArgs),
}

impl ServerCommand {
    /// Run the server subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match self {
            ServerCommand::List(args) => args.run(app, global).await,
        }
    }
}

// =============================================================================
// List
// =============================================================================

/// Arguments for the server list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub output: OutputSink,
}

impl ListArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let mut profiles: Vec<&ServerProfile> = app.config().servers.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));

        if global.json {
            // ServerProfile skips the password when serialized.
            self.output.write_json(&profiles).await?;
            return Ok(());
        }

        let lines: Vec<String> = profiles
            .iter()
            .map(|profile| format!("{} ({})", profile.name, profile.host))
            .collect();
        self.output.write_str(&lines.join("\n")).await?;
        Ok(())
    }
}
