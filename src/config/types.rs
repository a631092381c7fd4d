//! Configuration types for ecmsync-rs.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

// =============================================================================
// Server Profile
// =============================================================================

/// Connection parameters for one remote ECM server.
///
/// Loaded from a `[server.{name}]` config section and treated as read-only
/// for the duration of a sync operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerProfile {
    /// Profile name (the `{name}` part of the section header).
    pub name: String,
    /// Server origin, e.g. "https://ecm.example.com:8443".
    pub host: String,
    /// Company id the credentials belong to.
    pub company_id: u64,
    /// Login username.
    pub username: String,
    /// Login password.
    #[serde(skip_serializing)]
    pub password: String,
    /// Colleague (user) code used by the forms service.
    pub user_code: String,
    /// When set, exports require re-entering the password first.
    pub confirm_exporting: bool,
}

// =============================================================================
// Config Sections
// =============================================================================

/// [workspace] section - local workspace settings.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceConfig {
    /// Workspace root directory. When absent, the current directory is used.
    pub root: Option<PathBuf>,
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub servers: HashMap<String, ServerProfile>,
}
