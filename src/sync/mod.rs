//! Import and export flows.
//!
//! Each flow is a sequential pipeline of suspension points: network calls
//! and interactive prompts. A cancelled prompt short-circuits the pipeline
//! with no remote mutation; a missing workspace aborts before any file
//! write or network call. Multi-item flows run items one at a time and only
//! report after the last item finished.

mod error;
mod export;
mod import;

pub use error::{Result, SyncError};
pub use export::{
    confirm_password, delete_events, export_event, export_form, EventDeleteInput,
    EventExportInput, FormExportInput, NEW_FORM_LABEL, PERSISTENCE_DATABASE_LABEL,
    PERSISTENCE_SINGLE_TABLE_LABEL, VERSION_KEEP_LABEL, VERSION_NEW_LABEL,
};
pub use import::{
    import_event, import_events, import_form, import_forms, EventImportInput, FormImportInput,
};

use serde::Serialize;

// =============================================================================
// Outcome Types
// =============================================================================

/// One failed item in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    /// The item's display name (form description or event id).
    pub name: String,
    /// Failure message, surfaced to the user verbatim.
    pub message: String,
}

/// Per-item results of a completed flow.
///
/// Partial success is possible: already processed items are not rolled back
/// when a later item fails.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<ItemFailure>,
}

impl BatchSummary {
    fn record(&mut self, name: &str, result: Result<()>) {
        match result {
            Ok(()) => self.succeeded.push(name.to_string()),
            Err(e) => self.failed.push(ItemFailure {
                name: name.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// How a flow ended.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// No usable workspace root; nothing was read, written, or fetched.
    NoWorkspace,
    /// The user cancelled at a prompt; no remote mutation happened.
    Cancelled,
    /// The flow ran to completion (possibly with per-item failures).
    Completed(BatchSummary),
}
