//! ecmsync-rs - A Rust command-line utility for syncing ECM forms and global
//! event scripts between a remote server and a local workspace.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod picker;
pub mod sync;
pub mod workspace;

pub use catalog::{
    Attachment, CatalogError, CustomEvent, EventCatalog, FormCatalog, FormRecord, FormUpdate,
    GlobalEvent, GlobalEventKey, MemoryEventCatalog, MemoryFormCatalog, NewForm, PersistenceMode,
    PushOutcome, RestEventCatalog, SoapFormCatalog, VersionOption,
};

pub use workspace::{Workspace, WorkspaceError, NO_WORKSPACE_MESSAGE};
