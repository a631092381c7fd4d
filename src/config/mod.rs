//! Configuration module.

mod read_config;
mod types;

pub use read_config::{read_config, ConfigError, ConfigResult, ConfigSource};
pub use types::{Config, ServerProfile, WorkspaceConfig};
