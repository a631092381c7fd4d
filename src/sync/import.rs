//! Import flows: pull remote resources into workspace files.

use crate::catalog::{EventCatalog, FormCatalog, FormRecord, GlobalEvent};
use crate::picker::labels;
use crate::picker::Prompter;
use crate::workspace::Workspace;

use super::error::Result;
use super::{BatchSummary, SyncOutcome};

// =============================================================================
// Inputs
// =============================================================================

/// Collaborators for a form import.
pub struct FormImportInput<'a> {
    pub catalog: &'a dyn FormCatalog,
    pub prompter: &'a dyn Prompter,
    /// `None` when no workspace root is usable; the flow aborts before any
    /// file write or network call.
    pub workspace: Option<&'a Workspace>,
}

/// Collaborators for a global event import.
pub struct EventImportInput<'a> {
    pub catalog: &'a dyn EventCatalog,
    pub prompter: &'a dyn Prompter,
    pub workspace: Option<&'a Workspace>,
}

// =============================================================================
// Form Import
// =============================================================================

/// Pull one form: every attachment, then every customization event script.
///
/// Each file write is independent; a failure aborts only this form.
async fn pull_form(
    catalog: &dyn FormCatalog,
    workspace: &Workspace,
    form: &FormRecord,
) -> Result<()> {
    let form_dir = workspace.form_dir(&form.document_description);

    for file_name in catalog.attachment_names(form.document_id).await? {
        let content = catalog
            .attachment_content(form.document_id, form.version, &file_name)
            .await?;
        workspace
            .write_file(&form_dir.join(&file_name), &content)
            .await?;
    }

    let events_dir = workspace.form_events_dir(&form.document_description);
    for event in catalog.custom_events(form.document_id).await? {
        workspace
            .write_file(
                &events_dir.join(format!("{}.js", event.event_id)),
                event.script.as_bytes(),
            )
            .await?;
    }

    Ok(())
}

/// Import a single form chosen from the remote catalog.
pub async fn import_form(input: FormImportInput<'_>) -> Result<SyncOutcome> {
    let Some(workspace) = input.workspace else {
        return Ok(SyncOutcome::NoWorkspace);
    };

    let forms = input.catalog.list_forms().await?;
    let options = labels::form_labels(&forms);
    let Some(chosen) = input.prompter.pick_one("Select the form", &options).await? else {
        return Ok(SyncOutcome::Cancelled);
    };
    let Some(form) = labels::find_form(&forms, &chosen) else {
        return Ok(SyncOutcome::Cancelled);
    };

    let mut summary = BatchSummary::default();
    let result = pull_form(input.catalog, workspace, form).await;
    summary.record(&form.document_description, result);
    Ok(SyncOutcome::Completed(summary))
}

/// Import several forms chosen from the remote catalog.
///
/// Items run sequentially; the summary is only produced after the last item
/// finished, and a failed item does not stop the rest.
pub async fn import_forms(input: FormImportInput<'_>) -> Result<SyncOutcome> {
    let Some(workspace) = input.workspace else {
        return Ok(SyncOutcome::NoWorkspace);
    };

    let forms = input.catalog.list_forms().await?;
    let options = labels::form_labels(&forms);
    let Some(chosen) = input.prompter.pick_many("Select the forms", &options).await? else {
        return Ok(SyncOutcome::Cancelled);
    };

    let mut summary = BatchSummary::default();
    for label in &chosen {
        let Some(form) = labels::find_form(&forms, label) else {
            continue;
        };
        let result = pull_form(input.catalog, workspace, form).await;
        summary.record(&form.document_description, result);
    }
    Ok(SyncOutcome::Completed(summary))
}

// =============================================================================
// Global Event Import
// =============================================================================

async fn pull_event(workspace: &Workspace, event: &GlobalEvent) -> Result<()> {
    workspace
        .write_file(
            &workspace.event_file(&event.key.event_id),
            event.script.as_bytes(),
        )
        .await?;
    Ok(())
}

/// Import a single global event script.
pub async fn import_event(input: EventImportInput<'_>) -> Result<SyncOutcome> {
    let Some(workspace) = input.workspace else {
        return Ok(SyncOutcome::NoWorkspace);
    };

    let events = input.catalog.list_events().await?;
    let options = labels::event_labels(&events);
    let Some(chosen) = input.prompter.pick_one("Select the event", &options).await? else {
        return Ok(SyncOutcome::Cancelled);
    };
    let Some(event) = labels::find_event(&events, &chosen) else {
        return Ok(SyncOutcome::Cancelled);
    };

    let mut summary = BatchSummary::default();
    let result = pull_event(workspace, event).await;
    summary.record(&event.key.event_id, result);
    Ok(SyncOutcome::Completed(summary))
}

/// Import several global event scripts.
pub async fn import_events(input: EventImportInput<'_>) -> Result<SyncOutcome> {
    let Some(workspace) = input.workspace else {
        return Ok(SyncOutcome::NoWorkspace);
    };

    let events = input.catalog.list_events().await?;
    let options = labels::event_labels(&events);
    let Some(chosen) = input.prompter.pick_many("Select the events", &options).await? else {
        return Ok(SyncOutcome::Cancelled);
    };

    let mut summary = BatchSummary::default();
    for label in &chosen {
        let Some(event) = labels::find_event(&events, label) else {
            continue;
        };
        let result = pull_event(workspace, event).await;
        summary.record(&event.key.event_id, result);
    }
    Ok(SyncOutcome::Completed(summary))
}

// =============================================================================
// Tests
// =============================================================================
