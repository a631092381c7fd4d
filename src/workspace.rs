//! Local workspace layout and file collection.
//!
//! Every remote resource maps to exactly one location under the workspace
//! root: `forms/<description>/<attachment>`,
//! `forms/<description>/events/<event_id>.js` for a form's customization
//! events, and `events/<event_id>.js` for global events.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use crate::catalog::{Attachment, CustomEvent};

/// Directory holding imported forms, one subdirectory per form.
pub const FORMS_DIR: &str = "forms";

/// Directory holding global event scripts.
pub const EVENTS_DIR: &str = "events";

/// Informational message shown when no workspace root is usable.
pub const NO_WORKSPACE_MESSAGE: &str = "You need an open workspace directory.";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur in workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{}", NO_WORKSPACE_MESSAGE)]
    NoWorkspace,

    #[error("path is not inside a {FORMS_DIR}/ directory: {0}")]
    NotAFormPath(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, WorkspaceError>;

// =============================================================================
// Workspace
// =============================================================================

/// A local workspace directory that form and event files sync into.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Resolve the workspace root.
    ///
    /// Precedence: explicit path, then the configured root, then the current
    /// directory. An explicit or configured root that does not exist yields
    /// `WorkspaceError::NoWorkspace` so callers abort before any file write
    /// or network call.
    pub fn resolve(explicit: Option<&Path>, configured: Option<&Path>) -> Result<Self> {
        if let Some(root) = explicit.or(configured) {
            if !root.is_dir() {
                return Err(WorkspaceError::NoWorkspace);
            }
            return Ok(Self {
                root: root.to_path_buf(),
            });
        }

        let current = std::env::current_dir().map_err(|_| WorkspaceError::NoWorkspace)?;
        Ok(Self { root: current })
    }

    /// Create a workspace at a known-good root.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Directory of one imported form: `forms/<description>`.
    pub fn form_dir(&self, description: &str) -> PathBuf {
        self.root.join(FORMS_DIR).join(description)
    }

    /// Events directory of one imported form: `forms/<description>/events`.
    pub fn form_events_dir(&self, description: &str) -> PathBuf {
        self.form_dir(description).join(EVENTS_DIR)
    }

    /// Local file of one global event: `events/<event_id>.js`.
    pub fn event_file(&self, event_id: &str) -> PathBuf {
        self.root
            .join(EVENTS_DIR)
            .join(format!("{}.js", event_id))
    }

    /// Write one file, creating parent directories as needed.
    pub async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, contents).await?;
        Ok(())
    }

    // =========================================================================
    // Export-side collection
    // =========================================================================

    /// Collect every regular file under `forms/<folder>` as an attachment,
    /// excluding the `events/` subtree. The attachment whose stem equals
    /// `form_name` is flagged as principal.
    pub async fn collect_attachments(
        &self,
        folder: &str,
        form_name: &str,
    ) -> Result<Vec<Attachment>> {
        let form_dir = self.form_dir(folder);
        let events_dir = self.form_events_dir(folder);

        let mut attachments = Vec::new();
        let mut pending = vec![form_dir];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path == events_dir {
                    continue;
                }
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }

                let file_name = entry.file_name().to_string_lossy().to_string();
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();

                attachments.push(Attachment {
                    principal: stem == form_name,
                    content: fs::read(&path).await?,
                    file_name,
                });
            }
        }

        // Deterministic payload order regardless of directory iteration order.
        attachments.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(attachments)
    }

    /// Collect `forms/<folder>/events/*.js` as customization events,
    /// keyed by file stem.
    pub async fn collect_custom_events(&self, folder: &str) -> Result<Vec<CustomEvent>> {
        let events_dir = self.form_events_dir(folder);
        if !events_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        let mut entries = fs::read_dir(&events_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("js") {
                continue;
            }
            let event_id = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => continue,
            };
            events.push(CustomEvent {
                event_id,
                script: fs::read_to_string(&path).await?,
            });
        }

        events.sort_by(|a, b| a.event_id.cmp(&b.event_id));
        Ok(events)
    }
}

// =============================================================================
// Export Name Derivation
// =============================================================================

/// The form folder name of a path under `forms/`: the first component after
/// the `forms` segment. Works for the folder itself or any file inside it.
pub fn form_folder_name(path: &Path) -> Option<String> {
    let mut components = path.components();
    while let Some(component) = components.next() {
        if let Component::Normal(name) = component {
            if name == FORMS_DIR {
                if let Some(Component::Normal(folder)) = components.next() {
                    return Some(folder.to_string_lossy().to_string());
                }
                return None;
            }
        }
    }
    None
}

/// Strip the optional `"<digits> - "` prefix some tooling adds when a form
/// folder is created from a picker label.
pub fn strip_id_prefix(folder_name: &str) -> &str {
    if let Some((prefix, rest)) = folder_name.split_once(" - ") {
        if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
            return rest;
        }
    }
    folder_name
}

/// Derive the candidate remote form name for a local path.
pub fn derive_form_name(path: &Path) -> Result<(String, String)> {
    let folder = form_folder_name(path)
        .ok_or_else(|| WorkspaceError::NotAFormPath(path.to_path_buf()))?;
    let name = strip_id_prefix(&folder).to_string();
    Ok((folder, name))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let ws = Workspace::at("/ws");
        assert_eq!(ws.form_dir("Invoice"), PathBuf::from("/ws/forms/Invoice"));
        assert_eq!(
            ws.form_events_dir("Invoice"),
            PathBuf::from("/ws/forms/Invoice/events")
        );
        assert_eq!(
            ws.event_file("displayCentralTasks"),
            PathBuf::from("/ws/events/displayCentralTasks.js")
        );
    }

    #[test]
    fn test_form_folder_name() {
        assert_eq!(
            form_folder_name(Path::new("/ws/forms/Invoice/main.html")),
            Some("Invoice".to_string())
        );
        assert_eq!(
            form_folder_name(Path::new("forms/Invoice")),
            Some("Invoice".to_string())
        );
        assert_eq!(form_folder_name(Path::new("/ws/events/x.js")), None);
        assert_eq!(form_folder_name(Path::new("/ws/forms")), None);
    }

    #[test]
    fn test_strip_id_prefix() {
        assert_eq!(strip_id_prefix("42 - Invoice"), "Invoice");
        assert_eq!(strip_id_prefix("Invoice"), "Invoice");
        // Only an all-digit prefix is stripped.
        assert_eq!(strip_id_prefix("v2 - Invoice"), "v2 - Invoice");
        assert_eq!(strip_id_prefix(" - Invoice"), " - Invoice");
    }

    #[test]
    fn test_resolve_missing_explicit_root() {
        let err = Workspace::resolve(Some(Path::new("/nonexistent/ws")), None).unwrap_err();
        assert!(matches!(err, WorkspaceError::NoWorkspace));
        assert_eq!(err.to_string(), NO_WORKSPACE_MESSAGE);
    }

    #[tokio::test]
    async fn test_collect_attachments_excludes_events() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());

        ws.write_file(&ws.form_dir("Invoice").join("Invoice.html"), b"<html/>")
            .await
            .unwrap();
        ws.write_file(&ws.form_dir("Invoice").join("style.css"), b"body {}")
            .await
            .unwrap();
        ws.write_file(
            &ws.form_events_dir("Invoice").join("beforeSave.js"),
            b"function beforeSave() {}",
        )
        .await
        .unwrap();

        let attachments = ws.collect_attachments("Invoice", "Invoice").await.unwrap();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].file_name, "Invoice.html");
        assert!(attachments[0].principal);
        assert_eq!(attachments[1].file_name, "style.css");
        assert!(!attachments[1].principal);

        let events = ws.collect_custom_events("Invoice").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, "beforeSave");
        assert_eq!(events[0].script, "function beforeSave() {}");
    }

    #[tokio::test]
    async fn test_collect_attachments_recurses_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());

        ws.write_file(&ws.form_dir("Orders").join("img/logo.svg"), b"<svg/>")
            .await
            .unwrap();
        ws.write_file(&ws.form_dir("Orders").join("Orders.html"), b"<html/>")
            .await
            .unwrap();

        let attachments = ws.collect_attachments("Orders", "Orders").await.unwrap();
        let names: Vec<&str> = attachments.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["Orders.html", "logo.svg"]);
    }

    #[tokio::test]
    async fn test_collect_custom_events_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        tokio::fs::create_dir_all(ws.form_dir("Empty")).await.unwrap();
        assert!(ws.collect_custom_events("Empty").await.unwrap().is_empty());
    }
}
