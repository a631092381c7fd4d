//! The global events accessor trait.

use async_trait::async_trait;

use super::types::{GlobalEvent, PushOutcome, Result};

/// Remote catalog accessor for global event scripts.
///
/// The remote API has no partial update: `save_events` overwrites the whole
/// catalog, so callers must read-modify-write the full list.
#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// List every global event. Empty list on no results.
    async fn list_events(&self) -> Result<Vec<GlobalEvent>>;

    /// Overwrite the full remote event catalog with the given list.
    async fn save_events(&self, events: &[GlobalEvent]) -> Result<PushOutcome>;

    /// Delete one global event by id.
    async fn delete_event(&self, event_id: &str) -> Result<PushOutcome>;
}
