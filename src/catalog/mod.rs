//! Remote catalog accessors for forms and global events.
//!
//! Two parallel accessors share one shape: list the remote resources, fetch
//! one resource's content, push content back. [`FormCatalog`] talks to the
//! card-index SOAP service; [`EventCatalog`] talks to the global events REST
//! service. In-memory implementations back the tests.

mod event_catalog;
mod form_catalog;
mod memory;
mod rest_event_catalog;
pub mod soap;
mod soap_form_catalog;
mod types;

pub use event_catalog::EventCatalog;
pub use form_catalog::FormCatalog;
pub use memory::{MemoryEventCatalog, MemoryFormCatalog, MemoryFormEntry};
pub use rest_event_catalog::RestEventCatalog;
pub use soap_form_catalog::SoapFormCatalog;
pub use types::{
    Attachment, CatalogError, CustomEvent, FormRecord, FormUpdate, GlobalEvent, GlobalEventKey,
    NewForm, PersistenceMode, PushOutcome, Result, VersionOption,
};
