//! Top-level application component.
//!
//! The [`App`] owns the loaded configuration and is the root for the
//! application's functionality: it selects server profiles and builds the
//! remote catalogs and the workspace handle the flows run against.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::catalog::{RestEventCatalog, SoapFormCatalog};
use crate::config::{read_config, Config, ConfigSource, ServerProfile};
use crate::picker::Prompter;
use crate::workspace::Workspace;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during App operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A server name that matches no configured profile.
    #[error("unknown server '{0}'")]
    UnknownServer(String),

    /// No server profiles are configured.
    #[error("no servers configured")]
    NoServers,

    /// Prompting failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for App operations.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Context Types
// =============================================================================

/// Context for creating an App.
#[derive(Default)]
pub struct AppContext {
    /// Source for configuration files.
    pub config_source: ConfigSource,
}

// =============================================================================
// App
// =============================================================================

/// The top-level application component.
///
/// Owns the configuration and builds the per-server collaborators.
pub struct App {
    config: Config,
}

impl App {
    /// Create a new App with the given context.
    pub fn new(ctx: AppContext) -> Result<Self> {
        let config =
            read_config(&ctx.config_source).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self { config })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the server profile a command runs against.
    ///
    /// A name given on the command line must match a configured profile. With
    /// no name, a single configured profile is taken as-is and multiple
    /// profiles go through the picker; `None` means the user cancelled.
    pub async fn select_profile(
        &self,
        name: Option<&str>,
        prompter: &dyn Prompter,
    ) -> Result<Option<ServerProfile>> {
        if let Some(name) = name {
            return match self.config.servers.get(name) {
                Some(profile) => Ok(Some(profile.clone())),
                None => Err(AppError::UnknownServer(name.to_string())),
            };
        }

        let mut names: Vec<&String> = self.config.servers.keys().collect();
        match names.len() {
            0 => Err(AppError::NoServers),
            1 => Ok(Some(self.config.servers[names[0]].clone())),
            _ => {
                names.sort();
                let options: Vec<String> = names.into_iter().cloned().collect();
                let chosen = prompter.pick_one("Select a server", &options).await?;
                Ok(chosen.map(|name| self.config.servers[&name].clone()))
            }
        }
    }

    /// Build the SOAP form catalog for a profile.
    pub fn form_catalog(&self, profile: &ServerProfile) -> SoapFormCatalog {
        SoapFormCatalog::new(profile.clone())
    }

    /// Build the REST global event catalog for a profile.
    pub fn event_catalog(&self, profile: &ServerProfile) -> RestEventCatalog {
        RestEventCatalog::new(profile.clone())
    }

    /// Resolve the workspace root: explicit path, then the configured root,
    /// then the current directory. `None` when the chosen root is unusable.
    pub fn workspace(&self, explicit: Option<&Path>) -> Option<Workspace> {
        Workspace::resolve(explicit, self.config.workspace.root.as_deref()).ok()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{Answer, ScriptedPrompter};

    fn app_with_servers(names: &[&str]) -> App {
        let mut config = Config::default();
        for name in names {
            config.servers.insert(
                name.to_string(),
                ServerProfile {
                    name: name.to_string(),
                    host: format!("https://{}.example.com", name),
                    company_id: 1,
                    username: "admin".to_string(),
                    password: "secret".to_string(),
                    user_code: "adm01".to_string(),
                    confirm_exporting: false,
                },
            );
        }
        App { config }
    }

    #[tokio::test]
    async fn test_named_profile_lookup() {
        let app = app_with_servers(&["prod", "staging"]);
        let prompter = ScriptedPrompter::new([]);

        let profile = app
            .select_profile(Some("prod"), &prompter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.name, "prod");

        let err = app.select_profile(Some("missing"), &prompter).await;
        assert!(matches!(err, Err(AppError::UnknownServer(_))));
    }

    #[tokio::test]
    async fn test_single_profile_skips_prompt() {
        let app = app_with_servers(&["prod"]);
        // An empty script cancels every prompt, so a prompt would show here.
        let prompter = ScriptedPrompter::new([]);

        let profile = app.select_profile(None, &prompter).await.unwrap().unwrap();
        assert_eq!(profile.name, "prod");
    }

    #[tokio::test]
    async fn test_multiple_profiles_go_through_picker() {
        let app = app_with_servers(&["prod", "staging"]);

        let prompter = ScriptedPrompter::new([Answer::one("staging")]);
        let profile = app.select_profile(None, &prompter).await.unwrap().unwrap();
        assert_eq!(profile.name, "staging");

        let prompter = ScriptedPrompter::new([Answer::Cancel]);
        assert!(app.select_profile(None, &prompter).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_servers_is_an_error() {
        let app = app_with_servers(&[]);
        let prompter = ScriptedPrompter::new([]);
        assert!(matches!(
            app.select_profile(None, &prompter).await,
            Err(AppError::NoServers)
        ));
    }
}
