//! In-memory catalog implementations, intended primarily for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::event_catalog::EventCatalog;
use super::form_catalog::FormCatalog;
use super::types::{
    Attachment, CatalogError, CustomEvent, FormRecord, FormUpdate, GlobalEvent, NewForm,
    PushOutcome, Result,
};

// =============================================================================
// Form Catalog
// =============================================================================

/// Per-form remote state held by the memory catalog.
#[derive(Debug, Clone, Default)]
pub struct MemoryFormEntry {
    pub attachments: Vec<Attachment>,
    pub custom_events: Vec<CustomEvent>,
}

/// An in-memory implementation of `FormCatalog`.
pub struct MemoryFormCatalog {
    forms: RwLock<Vec<FormRecord>>,
    entries: RwLock<HashMap<u64, MemoryFormEntry>>,
    created: RwLock<Vec<NewForm>>,
    updated: RwLock<Vec<FormUpdate>>,
    /// When set, pushes come back rejected with this message.
    reject_pushes_with: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryFormCatalog {
    /// Create a new empty in-memory catalog.
    pub fn new() -> Self {
        Self {
            forms: RwLock::new(Vec::new()),
            entries: RwLock::new(HashMap::new()),
            created: RwLock::new(Vec::new()),
            updated: RwLock::new(Vec::new()),
            reject_pushes_with: RwLock::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Seed one form with its attachments and events.
    pub fn with_form(
        self,
        form: FormRecord,
        attachments: Vec<Attachment>,
        custom_events: Vec<CustomEvent>,
    ) -> Self {
        {
            let mut entries = self.entries.write().unwrap();
            entries.insert(
                form.document_id,
                MemoryFormEntry {
                    attachments,
                    custom_events,
                },
            );
            self.forms.write().unwrap().push(form);
        }
        self
    }

    /// Seed a form that is listed but has no stored content, so dependent
    /// fetches fail.
    pub fn with_listed_form(self, form: FormRecord) -> Self {
        self.forms.write().unwrap().push(form);
        self
    }

    /// Make subsequent pushes come back rejected with the given message.
    pub fn rejecting_pushes(self, message: impl Into<String>) -> Self {
        *self.reject_pushes_with.write().unwrap() = Some(message.into());
        self
    }

    /// Number of catalog calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Forms created through this catalog.
    pub fn created(&self) -> Vec<NewForm> {
        self.created.read().unwrap().clone()
    }

    /// Updates pushed through this catalog.
    pub fn updated(&self) -> Vec<FormUpdate> {
        self.updated.read().unwrap().clone()
    }

    fn push_result(&self) -> PushOutcome {
        match &*self.reject_pushes_with.read().unwrap() {
            Some(message) => PushOutcome::Rejected(message.clone()),
            None => PushOutcome::Accepted,
        }
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for MemoryFormCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormCatalog for MemoryFormCatalog {
    async fn list_forms(&self) -> Result<Vec<FormRecord>> {
        self.record_call();
        Ok(self.forms.read().unwrap().clone())
    }

    async fn attachment_names(&self, document_id: u64) -> Result<Vec<String>> {
        self.record_call();
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(&document_id)
            .ok_or_else(|| CatalogError::Rejected(format!("no form {}", document_id)))?;
        Ok(entry
            .attachments
            .iter()
            .map(|a| a.file_name.clone())
            .collect())
    }

    async fn attachment_content(
        &self,
        document_id: u64,
        _version: u64,
        file_name: &str,
    ) -> Result<Vec<u8>> {
        self.record_call();
        let entries = self.entries.read().unwrap();
        entries
            .get(&document_id)
            .and_then(|entry| {
                entry
                    .attachments
                    .iter()
                    .find(|a| a.file_name == file_name)
                    .map(|a| a.content.clone())
            })
            .ok_or_else(|| CatalogError::Rejected(format!("no attachment {}", file_name)))
    }

    async fn custom_events(&self, document_id: u64) -> Result<Vec<CustomEvent>> {
        self.record_call();
        let entries = self.entries.read().unwrap();
        Ok(entries
            .get(&document_id)
            .map(|entry| entry.custom_events.clone())
            .unwrap_or_default())
    }

    async fn create_form(&self, form: &NewForm) -> Result<PushOutcome> {
        self.record_call();
        let outcome = self.push_result();
        if outcome.is_accepted() {
            self.created.write().unwrap().push(form.clone());
        }
        Ok(outcome)
    }

    async fn update_form(&self, update: &FormUpdate) -> Result<PushOutcome> {
        self.record_call();
        let outcome = self.push_result();
        if outcome.is_accepted() {
            self.updated.write().unwrap().push(update.clone());
        }
        Ok(outcome)
    }
}

// =============================================================================
// Event Catalog
// =============================================================================

/// An in-memory implementation of `EventCatalog`.
pub struct MemoryEventCatalog {
    events: RwLock<Vec<GlobalEvent>>,
    saves: AtomicUsize,
    calls: AtomicUsize,
}

impl MemoryEventCatalog {
    /// Create a new catalog seeded with the given events.
    pub fn new(events: Vec<GlobalEvent>) -> Self {
        Self {
            events: RwLock::new(events),
            saves: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Current remote event list.
    pub fn events(&self) -> Vec<GlobalEvent> {
        self.events.read().unwrap().clone()
    }

    /// Number of whole-list saves performed.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of catalog calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventCatalog for MemoryEventCatalog {
    async fn list_events(&self) -> Result<Vec<GlobalEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.events.read().unwrap().clone())
    }

    async fn save_events(&self, events: &[GlobalEvent]) -> Result<PushOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saves.fetch_add(1, Ordering::SeqCst);
        // Whole-list overwrite, like the remote API.
        *self.events.write().unwrap() = events.to_vec();
        Ok(PushOutcome::Accepted)
    }

    async fn delete_event(&self, event_id: &str) -> Result<PushOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut events = self.events.write().unwrap();
        let before = events.len();
        events.retain(|event| event.key.event_id != event_id);
        if events.len() == before {
            Ok(PushOutcome::Rejected(format!(
                "event {} not found",
                event_id
            )))
        } else {
            Ok(PushOutcome::Accepted)
        }
    }
}
