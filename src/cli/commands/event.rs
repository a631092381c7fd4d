//! Global event subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::picker::TerminalPrompter;
use crate::sync::{
    delete_events, export_event, import_event, import_events, EventDeleteInput, EventExportInput,
    EventImportInput, SyncOutcome,
};

use super::report;

// =============================================================================
// Event Subcommands
// =============================================================================

/// Global event subcommands.
#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Download one or more global event scripts into the workspace.
    Import(ImportArgs),

    /// Upload a local event script to the server.
    Export(ExportArgs),

    /// Delete global events from the server.
    Delete(DeleteArgs),
}

impl EventCommand {
    /// Run the event subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match self {
            EventCommand::Import(args) => args.run(app, global).await,
            EventCommand::Export(args) => args.run(app, global).await,
            EventCommand::Delete(args) => args.run(app, global).await,
        }
    }
}

// =============================================================================
// Import
// =============================================================================

/// Arguments for the event import command.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Pick several events and import them in one pass.
    #[arg(long)]
    pub many: bool,

    #[command(flatten)]
    pub output: OutputSink,
}

impl ImportArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let prompter = TerminalPrompter::new();
        let Some(profile) = app
            .select_profile(global.server.as_deref(), &prompter)
            .await?
        else {
            return report(&SyncOutcome::Cancelled, "", &self.output, global.json).await;
        };

        let catalog = app.event_catalog(&profile);
        let workspace = app.workspace(global.workspace.as_deref());
        let input = EventImportInput {
            catalog: &catalog,
            prompter: &prompter,
            workspace: workspace.as_ref(),
        };

        let outcome = if self.many {
            import_events(input).await?
        } else {
            import_event(input).await?
        };
        report(&outcome, "Imported", &self.output, global.json).await
    }
}

// =============================================================================
// Export
// =============================================================================

/// Arguments for the event export command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path of the event script to export.
    pub path: PathBuf,

    #[command(flatten)]
    pub output: OutputSink,
}

impl ExportArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let prompter = TerminalPrompter::new();
        let Some(profile) = app
            .select_profile(global.server.as_deref(), &prompter)
            .await?
        else {
            return report(&SyncOutcome::Cancelled, "", &self.output, global.json).await;
        };

        let catalog = app.event_catalog(&profile);
        let outcome = export_event(EventExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile,
            path: &self.path,
        })
        .await?;
        report(&outcome, "Exported", &self.output, global.json).await
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Arguments for the event delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub output: OutputSink,
}

impl DeleteArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let prompter = TerminalPrompter::new();
        let Some(profile) = app
            .select_profile(global.server.as_deref(), &prompter)
            .await?
        else {
            return report(&SyncOutcome::Cancelled, "", &self.output, global.json).await;
        };

        let catalog = app.event_catalog(&profile);
        let outcome = delete_events(EventDeleteInput {
            catalog: &catalog,
            prompter: &prompter,
        })
        .await?;
        report(&outcome, "Deleted", &self.output, global.json).await
    }
}
