//! Export flows: push workspace files back to the remote catalogs.
//!
//! Export moves through a fixed sequence of suspension points: server
//! already chosen by the caller, optional password confirmation, target
//! resolution (new vs existing), metadata prompts, file collection, push.
//! Missing input at any prompt aborts with no remote mutation.

use std::path::Path;

use crate::catalog::{
    EventCatalog, FormCatalog, FormRecord, FormUpdate, GlobalEvent, GlobalEventKey, NewForm,
    PersistenceMode, PushOutcome, VersionOption,
};
use crate::config::ServerProfile;
use crate::picker::labels;
use crate::picker::Prompter;
use crate::workspace::{self, Workspace};

use super::error::{Result, SyncError};
use super::{BatchSummary, ItemFailure, SyncOutcome};

/// Picker entry offered for creating a form that does not exist remotely.
pub const NEW_FORM_LABEL: &str = "New form";

/// Storage mode picker entries.
pub const PERSISTENCE_DATABASE_LABEL: &str = "Database tables (recommended)";
pub const PERSISTENCE_SINGLE_TABLE_LABEL: &str = "Single table (small record counts)";

/// Version handling picker entries.
pub const VERSION_NEW_LABEL: &str = "Create new version";
pub const VERSION_KEEP_LABEL: &str = "Keep version";

// =============================================================================
// Inputs
// =============================================================================

/// Collaborators for a form export.
pub struct FormExportInput<'a> {
    pub catalog: &'a dyn FormCatalog,
    pub prompter: &'a dyn Prompter,
    pub profile: &'a ServerProfile,
    pub workspace: Option<&'a Workspace>,
    /// Local path of the form folder or any file inside it.
    pub path: &'a Path,
}

/// Collaborators for a global event export.
pub struct EventExportInput<'a> {
    pub catalog: &'a dyn EventCatalog,
    pub prompter: &'a dyn Prompter,
    pub profile: &'a ServerProfile,
    /// Local path of the event script (`events/<id>.js`).
    pub path: &'a Path,
}

/// Collaborators for a global event delete.
pub struct EventDeleteInput<'a> {
    pub catalog: &'a dyn EventCatalog,
    pub prompter: &'a dyn Prompter,
}

// =============================================================================
// Password Gate
// =============================================================================

/// Re-confirm the server password before a destructive push.
///
/// Active only when the profile requests it. Loops until the entered value
/// matches the stored password; returns false when the user cancels.
pub async fn confirm_password(prompter: &dyn Prompter, profile: &ServerProfile) -> Result<bool> {
    if !profile.confirm_exporting {
        return Ok(true);
    }

    let mut prompt = format!("Password for server {}", profile.name);
    loop {
        let Some(entered) = prompter.input_masked(&prompt).await? else {
            return Ok(false);
        };
        if entered == profile.password {
            return Ok(true);
        }
        prompt = format!("Wrong password for server {}, try again", profile.name);
    }
}

// =============================================================================
// Form Export
// =============================================================================

/// Remote target an export resolves to.
enum ExportTarget<'a> {
    New,
    Existing(&'a FormRecord),
}

/// Offer the matching remote form first (when the local name matches one by
/// id or description), then the new-form entry, then everything else.
async fn resolve_target<'a>(
    prompter: &dyn Prompter,
    forms: &'a [FormRecord],
    candidate_name: &str,
) -> Result<Option<ExportTarget<'a>>> {
    let mut options = Vec::with_capacity(forms.len() + 1);
    let matched = forms.iter().find(|form| {
        candidate_name == form.document_id.to_string()
            || candidate_name == form.document_description
    });
    if let Some(form) = matched {
        options.push(labels::form_label(form));
    }
    options.push(NEW_FORM_LABEL.to_string());
    for form in forms {
        if matched.map(|m| m.document_id) != Some(form.document_id) {
            options.push(labels::form_label(form));
        }
    }

    let Some(chosen) = prompter.pick_one("Create or update form?", &options).await? else {
        return Ok(None);
    };
    if chosen == NEW_FORM_LABEL {
        return Ok(Some(ExportTarget::New));
    }
    Ok(labels::find_form(forms, &chosen).map(ExportTarget::Existing))
}

struct NewFormMetadata {
    name: String,
    dataset_name: String,
    parent_document_id: u64,
    persistence: PersistenceMode,
}

async fn prompt_new_metadata(
    prompter: &dyn Prompter,
    candidate_name: &str,
) -> Result<Option<NewFormMetadata>> {
    let Some(name) = prompter.input("Form name", Some(candidate_name)).await? else {
        return Ok(None);
    };

    let default_dataset = format!("ds_{}", name);
    let Some(dataset_name) = prompter
        .input("Dataset name", Some(&default_dataset))
        .await?
    else {
        return Ok(None);
    };

    let Some(parent) = prompter.input("Parent folder id", Some("2")).await? else {
        return Ok(None);
    };
    let parent_document_id: u64 = parent
        .trim()
        .parse()
        .map_err(|_| SyncError::InvalidNumber(parent.clone()))?;

    let modes = vec![
        PERSISTENCE_DATABASE_LABEL.to_string(),
        PERSISTENCE_SINGLE_TABLE_LABEL.to_string(),
    ];
    let Some(mode) = prompter.pick_one("Storage mode?", &modes).await? else {
        return Ok(None);
    };
    let persistence = if mode == PERSISTENCE_SINGLE_TABLE_LABEL {
        PersistenceMode::SingleTable
    } else {
        PersistenceMode::DatabaseTables
    };

    Ok(Some(NewFormMetadata {
        name,
        dataset_name,
        parent_document_id,
        persistence,
    }))
}

struct UpdateMetadata {
    dataset_name: String,
    version_option: VersionOption,
}

async fn prompt_update_metadata(
    prompter: &dyn Prompter,
    existing: &FormRecord,
) -> Result<Option<UpdateMetadata>> {
    let Some(dataset_name) = prompter
        .input("Dataset name", Some(&existing.dataset_name))
        .await?
    else {
        return Ok(None);
    };

    let choices = vec![VERSION_NEW_LABEL.to_string(), VERSION_KEEP_LABEL.to_string()];
    let Some(choice) = prompter.pick_one("Version handling?", &choices).await? else {
        return Ok(None);
    };
    let version_option = if choice == VERSION_KEEP_LABEL {
        VersionOption::KeepVersion
    } else {
        VersionOption::NewVersion
    };

    Ok(Some(UpdateMetadata {
        dataset_name,
        version_option,
    }))
}

fn outcome_summary(name: &str, outcome: PushOutcome) -> SyncOutcome {
    let mut summary = BatchSummary::default();
    match outcome {
        PushOutcome::Accepted => summary.succeeded.push(name.to_string()),
        PushOutcome::Rejected(message) => summary.failed.push(ItemFailure {
            name: name.to_string(),
            message,
        }),
    }
    SyncOutcome::Completed(summary)
}

/// Export one local form folder to the remote catalog, creating a new form
/// or updating an existing one.
pub async fn export_form(input: FormExportInput<'_>) -> Result<SyncOutcome> {
    let Some(ws) = input.workspace else {
        return Ok(SyncOutcome::NoWorkspace);
    };

    if !confirm_password(input.prompter, input.profile).await? {
        return Ok(SyncOutcome::Cancelled);
    }

    let (folder, candidate_name) = workspace::derive_form_name(input.path)?;

    let forms = input.catalog.list_forms().await?;
    let Some(target) = resolve_target(input.prompter, &forms, &candidate_name).await? else {
        return Ok(SyncOutcome::Cancelled);
    };

    match target {
        ExportTarget::New => {
            let Some(metadata) = prompt_new_metadata(input.prompter, &candidate_name).await?
            else {
                return Ok(SyncOutcome::Cancelled);
            };

            let form = NewForm {
                attachments: ws.collect_attachments(&folder, &candidate_name).await?,
                custom_events: ws.collect_custom_events(&folder).await?,
                name: metadata.name,
                dataset_name: metadata.dataset_name,
                parent_document_id: metadata.parent_document_id,
                persistence: metadata.persistence,
            };

            let name = form.name.clone();
            let outcome = input.catalog.create_form(&form).await?;
            Ok(outcome_summary(&name, outcome))
        }
        ExportTarget::Existing(existing) => {
            let Some(metadata) = prompt_update_metadata(input.prompter, existing).await? else {
                return Ok(SyncOutcome::Cancelled);
            };

            let update = FormUpdate {
                document_id: existing.document_id,
                attachments: ws.collect_attachments(&folder, &candidate_name).await?,
                custom_events: ws.collect_custom_events(&folder).await?,
                dataset_name: metadata.dataset_name,
                version_option: metadata.version_option,
            };

            let outcome = input.catalog.update_form(&update).await?;
            Ok(outcome_summary(&existing.document_description, outcome))
        }
    }
}

// =============================================================================
// Global Event Export
// =============================================================================

/// Export one local event script, replacing or appending its entry in the
/// remote list and pushing the whole list back.
pub async fn export_event(input: EventExportInput<'_>) -> Result<SyncOutcome> {
    let event_id = input
        .path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| SyncError::NotAnEventScript(input.path.to_path_buf()))?;

    let script = tokio::fs::read_to_string(input.path).await?;

    // Read-modify-write: the API only saves complete lists.
    let mut events = input.catalog.list_events().await?;
    let entry = GlobalEvent {
        key: GlobalEventKey {
            company_id: input.profile.company_id,
            event_id: event_id.clone(),
        },
        script,
    };
    match events
        .iter_mut()
        .find(|event| event.key.event_id == event_id)
    {
        Some(existing) => *existing = entry,
        None => events.push(entry),
    }

    if !confirm_password(input.prompter, input.profile).await? {
        return Ok(SyncOutcome::Cancelled);
    }

    let outcome = input.catalog.save_events(&events).await?;
    Ok(outcome_summary(&event_id, outcome))
}

/// Delete remotely the global events the user picks, one call per event.
pub async fn delete_events(input: EventDeleteInput<'_>) -> Result<SyncOutcome> {
    let events = input.catalog.list_events().await?;
    let options = labels::event_labels(&events);
    let Some(chosen) = input.prompter.pick_many("Select the events", &options).await? else {
        return Ok(SyncOutcome::Cancelled);
    };

    let mut summary = BatchSummary::default();
    for event_id in &chosen {
        match input.catalog.delete_event(event_id).await {
            Ok(PushOutcome::Accepted) => summary.succeeded.push(event_id.clone()),
            Ok(PushOutcome::Rejected(message)) => summary.failed.push(ItemFailure {
                name: event_id.clone(),
                message,
            }),
            Err(e) => summary.failed.push(ItemFailure {
                name: event_id.clone(),
                message: e.to_string(),
            }),
        }
    }
    Ok(SyncOutcome::Completed(summary))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Attachment, CustomEvent, MemoryEventCatalog, MemoryFormCatalog};
    use crate::picker::{Answer, ScriptedPrompter};
    use crate::sync::{import_form, FormImportInput};

    fn profile(confirm_exporting: bool) -> ServerProfile {
        ServerProfile {
            name: "prod".to_string(),
            host: "https://ecm.example.com".to_string(),
            company_id: 1,
            username: "admin".to_string(),
            password: "secret".to_string(),
            user_code: "adm01".to_string(),
            confirm_exporting,
        }
    }

    fn invoice_form() -> FormRecord {
        FormRecord {
            document_id: 42,
            document_description: "Invoice".to_string(),
            dataset_name: "ds_invoice".to_string(),
            version: 1000,
        }
    }

    fn seeded_workspace(dir: &Path) -> Workspace {
        let ws = Workspace::at(dir);
        std::fs::create_dir_all(dir.join("forms/Invoice/events")).unwrap();
        std::fs::write(dir.join("forms/Invoice/Invoice.html"), b"<html/>").unwrap();
        std::fs::write(
            dir.join("forms/Invoice/events/beforeSave.js"),
            b"function beforeSave() {}",
        )
        .unwrap();
        ws
    }

    fn event(id: &str, script: &str) -> GlobalEvent {
        GlobalEvent {
            key: GlobalEventKey {
                company_id: 1,
                event_id: id.to_string(),
            },
            script: script.to_string(),
        }
    }

    #[tokio::test]
    async fn test_export_new_form() {
        let dir = tempfile::tempdir().unwrap();
        let ws = seeded_workspace(dir.path());
        let catalog = MemoryFormCatalog::new();
        let prompter = ScriptedPrompter::new([
            Answer::one(NEW_FORM_LABEL),
            Answer::Default, // form name
            Answer::Default, // dataset name
            Answer::one("5"),
            Answer::one(PERSISTENCE_SINGLE_TABLE_LABEL),
        ]);

        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            workspace: Some(&ws),
            path: &dir.path().join("forms/Invoice"),
        })
        .await
        .unwrap();

        let SyncOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(summary.succeeded, vec!["Invoice"]);

        let created = catalog.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Invoice");
        assert_eq!(created[0].dataset_name, "ds_Invoice");
        assert_eq!(created[0].parent_document_id, 5);
        assert_eq!(created[0].persistence, PersistenceMode::SingleTable);
        assert_eq!(created[0].attachments.len(), 1);
        assert!(created[0].attachments[0].principal);
        assert_eq!(created[0].custom_events.len(), 1);
        assert_eq!(created[0].custom_events[0].event_id, "beforeSave");
    }

    #[tokio::test]
    async fn test_export_existing_form_update() {
        let dir = tempfile::tempdir().unwrap();
        let ws = seeded_workspace(dir.path());
        let catalog = MemoryFormCatalog::new().with_form(invoice_form(), Vec::new(), Vec::new());
        let prompter = ScriptedPrompter::new([
            Answer::one("42 - Invoice"),
            Answer::Default, // dataset name
            Answer::one(VERSION_KEEP_LABEL),
        ]);

        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            workspace: Some(&ws),
            path: &dir.path().join("forms/Invoice/Invoice.html"),
        })
        .await
        .unwrap();

        assert!(matches!(outcome, SyncOutcome::Completed(_)));
        let updated = catalog.updated();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].document_id, 42);
        assert_eq!(updated[0].dataset_name, "ds_invoice");
        assert_eq!(updated[0].version_option, VersionOption::KeepVersion);
    }

    #[tokio::test]
    async fn test_export_strips_id_prefix_from_folder() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        std::fs::create_dir_all(dir.path().join("forms/42 - Invoice")).unwrap();
        std::fs::write(dir.path().join("forms/42 - Invoice/Invoice.html"), b"x").unwrap();

        let catalog = MemoryFormCatalog::new().with_form(invoice_form(), Vec::new(), Vec::new());
        // The candidate name "Invoice" matches the remote form, which is
        // offered first; picking it updates rather than creates.
        let prompter = ScriptedPrompter::new([
            Answer::one("42 - Invoice"),
            Answer::Default,
            Answer::one(VERSION_NEW_LABEL),
        ]);

        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            workspace: Some(&ws),
            path: &dir.path().join("forms/42 - Invoice"),
        })
        .await
        .unwrap();

        assert!(matches!(outcome, SyncOutcome::Completed(_)));
        let updated = catalog.updated();
        assert_eq!(updated.len(), 1);
        // The principal flag keys off the stripped name.
        assert!(updated[0].attachments[0].principal);
    }

    #[tokio::test]
    async fn test_password_gate_blocks_push_until_correct() {
        let dir = tempfile::tempdir().unwrap();
        let ws = seeded_workspace(dir.path());
        let catalog = MemoryFormCatalog::new();

        // Wrong entry then cancel: nothing must reach the catalog.
        let prompter = ScriptedPrompter::new([Answer::one("wrong"), Answer::Cancel]);
        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(true),
            workspace: Some(&ws),
            path: &dir.path().join("forms/Invoice"),
        })
        .await
        .unwrap();
        assert!(matches!(outcome, SyncOutcome::Cancelled));
        assert_eq!(catalog.call_count(), 0);

        // Wrong entry then the correct password: the flow proceeds.
        let prompter = ScriptedPrompter::new([
            Answer::one("wrong"),
            Answer::one("secret"),
            Answer::one(NEW_FORM_LABEL),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::one(PERSISTENCE_DATABASE_LABEL),
        ]);
        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(true),
            workspace: Some(&ws),
            path: &dir.path().join("forms/Invoice"),
        })
        .await
        .unwrap();
        assert!(matches!(outcome, SyncOutcome::Completed(_)));
        assert_eq!(catalog.created().len(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_reproduces_attachment_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        let payload = b"\x00binary\xffpayload".to_vec();

        let catalog = MemoryFormCatalog::new().with_form(
            invoice_form(),
            vec![Attachment {
                file_name: "Invoice.html".to_string(),
                content: payload.clone(),
                principal: true,
            }],
            vec![CustomEvent {
                event_id: "beforeSave".to_string(),
                script: "function beforeSave() {}".to_string(),
            }],
        );

        // Import, then export the unmodified folder as an update.
        let prompter = ScriptedPrompter::new([Answer::one("42 - Invoice")]);
        import_form(FormImportInput {
            catalog: &catalog,
            prompter: &prompter,
            workspace: Some(&ws),
        })
        .await
        .unwrap();

        let prompter = ScriptedPrompter::new([
            Answer::one("42 - Invoice"),
            Answer::Default,
            Answer::one(VERSION_KEEP_LABEL),
        ]);
        export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            workspace: Some(&ws),
            path: &dir.path().join("forms/Invoice"),
        })
        .await
        .unwrap();

        let updated = catalog.updated();
        assert_eq!(updated[0].attachments.len(), 1);
        assert_eq!(updated[0].attachments[0].content, payload);
        assert_eq!(updated[0].custom_events[0].script, "function beforeSave() {}");
    }

    #[tokio::test]
    async fn test_export_event_replaces_without_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("events")).unwrap();
        let path = dir.path().join("events/notify.js");
        std::fs::write(&path, "function notify() { /* v2 */ }").unwrap();

        let catalog = MemoryEventCatalog::new(vec![
            event("notify", "function notify() {}"),
            event("other", "function other() {}"),
        ]);
        let prompter = ScriptedPrompter::new([]);

        let outcome = export_event(EventExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            path: &path,
        })
        .await
        .unwrap();

        let SyncOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(summary.succeeded, vec!["notify"]);
        assert_eq!(catalog.save_count(), 1);

        let events = catalog.events();
        assert_eq!(events.len(), 2);
        let notify = events.iter().find(|e| e.key.event_id == "notify").unwrap();
        assert_eq!(notify.script, "function notify() { /* v2 */ }");
    }

    #[tokio::test]
    async fn test_export_event_appends_new_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("events")).unwrap();
        let path = dir.path().join("events/fresh.js");
        std::fs::write(&path, "function fresh() {}").unwrap();

        let catalog = MemoryEventCatalog::new(vec![event("other", "x")]);
        let prompter = ScriptedPrompter::new([]);

        export_event(EventExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            path: &path,
        })
        .await
        .unwrap();

        let events = catalog.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.key.event_id == "fresh"));
    }

    #[tokio::test]
    async fn test_export_event_password_cancel_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("events")).unwrap();
        let path = dir.path().join("events/notify.js");
        std::fs::write(&path, "x").unwrap();

        let catalog = MemoryEventCatalog::new(vec![event("notify", "old")]);
        let prompter = ScriptedPrompter::new([Answer::Cancel]);

        let outcome = export_event(EventExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(true),
            path: &path,
        })
        .await
        .unwrap();

        assert!(matches!(outcome, SyncOutcome::Cancelled));
        assert_eq!(catalog.save_count(), 0);
        assert_eq!(catalog.events()[0].script, "old");
    }

    #[tokio::test]
    async fn test_delete_events_reports_per_item() {
        let catalog = MemoryEventCatalog::new(vec![event("a", "aa"), event("b", "bb")]);
        let prompter = ScriptedPrompter::new([Answer::many(["a", "missing"])]);

        let outcome = delete_events(EventDeleteInput {
            catalog: &catalog,
            prompter: &prompter,
        })
        .await
        .unwrap();

        let SyncOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(summary.succeeded, vec!["a"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].name, "missing");
        assert_eq!(catalog.events().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_push_surfaces_message() {
        let dir = tempfile::tempdir().unwrap();
        let ws = seeded_workspace(dir.path());
        let catalog = MemoryFormCatalog::new().rejecting_pushes("Dataset not found");
        let prompter = ScriptedPrompter::new([
            Answer::one(NEW_FORM_LABEL),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::one(PERSISTENCE_DATABASE_LABEL),
        ]);

        let outcome = export_form(FormExportInput {
            catalog: &catalog,
            prompter: &prompter,
            profile: &profile(false),
            workspace: Some(&ws),
            path: &dir.path().join("forms/Invoice"),
        })
        .await
        .unwrap();

        let SyncOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        assert!(summary.succeeded.is_empty());
        assert_eq!(summary.failed[0].message, "Dataset not found");
    }
}
