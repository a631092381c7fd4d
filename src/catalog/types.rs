//! Shared types for the remote catalog accessors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Unexpected HTTP status from the server.
    #[error("unexpected status code: {0}")]
    Status(u16),

    /// Response body could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The server processed the call but rejected it; the message is
    /// surfaced to the user verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Attachment content was not valid base64.
    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

// =============================================================================
// Form Types
// =============================================================================

/// A remote form definition as listed by the card-index catalog.
///
/// Identity is `document_id` remotely and the folder name
/// `forms/<document_description>` locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRecord {
    pub document_id: u64,
    pub document_description: String,
    pub dataset_name: String,
    pub version: u64,
}

/// One attachment of a form. `content` holds the decoded bytes; base64
/// transcoding happens at the accessor boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content: Vec<u8>,
    /// The attachment flagged as the form's main file.
    pub principal: bool,
}

/// A customization event script attached to one form.
///
/// Maps to the local file `forms/<description>/events/<event_id>.js`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEvent {
    pub event_id: String,
    pub script: String,
}

/// Storage mode for a newly created form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    /// One table per field set (the server's recommended mode).
    DatabaseTables,
    /// Everything in a single table; only for small record counts.
    SingleTable,
}

impl PersistenceMode {
    /// The numeric code the forms service expects.
    pub fn code(self) -> u64 {
        match self {
            PersistenceMode::DatabaseTables => 0,
            PersistenceMode::SingleTable => 1,
        }
    }
}

/// Version handling for an update to an existing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOption {
    NewVersion,
    KeepVersion,
}

impl VersionOption {
    /// The wire code the forms service expects.
    pub fn code(self) -> &'static str {
        match self {
            VersionOption::NewVersion => "2",
            VersionOption::KeepVersion => "0",
        }
    }
}

/// Payload for creating a form that does not yet exist remotely.
#[derive(Debug, Clone)]
pub struct NewForm {
    pub name: String,
    pub dataset_name: String,
    pub parent_document_id: u64,
    pub persistence: PersistenceMode,
    pub attachments: Vec<Attachment>,
    pub custom_events: Vec<CustomEvent>,
}

/// Payload for updating an existing remote form.
#[derive(Debug, Clone)]
pub struct FormUpdate {
    pub document_id: u64,
    pub dataset_name: String,
    pub version_option: VersionOption,
    pub attachments: Vec<Attachment>,
    pub custom_events: Vec<CustomEvent>,
}

// =============================================================================
// Global Event Types
// =============================================================================

/// Primary key of a global event: {company, event id}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEventKey {
    #[serde(rename = "companyId")]
    pub company_id: u64,
    #[serde(rename = "eventId")]
    pub event_id: String,
}

/// A server-wide named script resource.
///
/// Maps 1:1 to the local file `events/<event_id>.js`. The wire field names
/// follow the events REST service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEvent {
    #[serde(rename = "globalEventPK")]
    pub key: GlobalEventKey,
    #[serde(rename = "eventDescription")]
    pub script: String,
}

// =============================================================================
// Push Outcome
// =============================================================================

/// Result of a create/update/delete push.
///
/// The remote signals success with a sentinel "ok" status string; any other
/// value is a user-facing rejection message, not a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    Rejected(String),
}

impl PushOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PushOutcome::Accepted)
    }
}
