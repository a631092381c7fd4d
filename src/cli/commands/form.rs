//! Form subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::picker::TerminalPrompter;
use crate::sync::{
    export_form, import_form, import_forms, FormExportInput, FormImportInput, SyncOutcome,
};

use super::report;

// =============================================================================
// Form Subcommands
// =============================================================================

/// Form subcommands.
#[derive(Subcommand, Debug)]
pub enum FormCommand {
    /// Download one or more forms into the workspace.
    Import(ImportArgs),

    /// Upload a local form folder to the server.
    Export(ExportArgs),
}

impl FormCommand {
    /// Run the form subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match self {
            FormCommand::Import(args) => args.run(app, global).await,
            FormCommand::Export(args) => args.run(app, global).await,
        }
    }
}

// =============================================================================
// Import
// =============================================================================

/// Arguments for the form import command.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Pick several forms and import them in one pass.
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

        let catalog = app.form_catalog(&profile);
        let workspace = app.workspace(global.workspace.as_deref());
        let input = FormImportInput {
            catalog: &catalog,
            prompter: &prompter,
            workspace: workspace.as_ref(),
        };

        let outcome = if self.many {
            import_forms(input).await?
        } else {
            import_form(input).await?
        };
        report(&outcome, "Imported", &self.output, global.json).await
    }
}

// =============================================================================
// Export
// =============================================================================

/// Arguments for the form export command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path of the form folder (or any file inside it) to export.
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

        let catalog = app.form_catalog(&profile);
        let workspace = app.workspace(global.workspace.as_deref());

        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile,
            workspace: workspace.as_ref(),
            path: &self.path,
        })
        .await?;
        report(&outcome, "Exported", &self.output, global.json).await
    }
}
