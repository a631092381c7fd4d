//! The forms accessor trait.

use async_trait::async_trait;

use super::types::{Attachment, CustomEvent, FormRecord, FormUpdate, NewForm, PushOutcome, Result};

/// Remote catalog accessor for form definitions.
///
/// All operations are asynchronous and issue one network round trip.
/// Implementations surface transport and auth failures as errors; a push
/// that the server declines comes back as `PushOutcome::Rejected` instead.
#[async_trait]
pub trait FormCatalog: Send + Sync {
    /// List every form in the remote catalog. Empty list on no results.
    async fn list_forms(&self) -> Result<Vec<FormRecord>>;

    /// List the attachment file names of one form.
    async fn attachment_names(&self, document_id: u64) -> Result<Vec<String>>;

    /// Fetch one attachment's content, decoded from the wire base64.
    async fn attachment_content(
        &self,
        document_id: u64,
        version: u64,
        file_name: &str,
    ) -> Result<Vec<u8>>;

    /// List the customization event scripts of one form.
    async fn custom_events(&self, document_id: u64) -> Result<Vec<CustomEvent>>;

    /// Create a new form.
    async fn create_form(&self, form: &NewForm) -> Result<PushOutcome>;

    /// Update an existing form.
    async fn update_form(&self, update: &FormUpdate) -> Result<PushOutcome>;
}
