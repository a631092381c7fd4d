//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{Config, ServerProfile, WorkspaceConfig};

// =============================================================================
// Constants
// =============================================================================

const ENV_CONFIG_FILE: &str = "ECMS_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".ecmsconfig";

const DEFAULT_COMPANY_ID: u64 = 1;
const DEFAULT_CONFIRM_EXPORTING: bool = false;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid integer '{value}' for key '{key}'")]
    InvalidInteger { key: String, value: String },

    #[error("invalid boolean '{value}' for key '{key}'")]
    InvalidBoolean { key: String, value: String },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },

    #[error("missing required field '{field}' in section '{section}'")]
    MissingRequiredField { section: String, field: String },
}

/// Result type for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to ECMS_CONFIG_FILE env var, then ~/.ecmsconfig.
    pub config_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "workspace.root", "server.prod.host"
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> ConfigResult<Option<PathBuf>> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(Some(path.clone()));
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    // Check environment variable
    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        // Nonexistent env-var path falls through to defaults
    }

    // Check ~/.ecmsconfig
    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(Some(default_path));
        }
    }

    // No config file found
    Ok(None)
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

// =============================================================================
// Value Parsing
// =============================================================================

/// Parse a boolean value.
fn parse_bool_value(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse an unsigned integer value.
fn parse_u64_value(key: &str, value: &str) -> ConfigResult<u64> {
    value.parse().map_err(|_| ConfigError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// =============================================================================
// INI Parsing
// =============================================================================

/// Load and parse an INI file.
fn load_ini(path: &Path) -> ConfigResult<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

/// Read a required field from a section.
fn require(ini: &Ini, section: &str, field: &str) -> ConfigResult<String> {
    ini.get(section, field)
        .ok_or_else(|| ConfigError::MissingRequiredField {
            section: section.to_string(),
            field: field.to_string(),
        })
}

/// Parse one `[server.{name}]` section into a ServerProfile.
fn parse_server_section(ini: &Ini, section: &str, name: &str) -> ConfigResult<ServerProfile> {
    let company_id = match ini.get(section, "company_id") {
        Some(v) => parse_u64_value("company_id", &v)?,
        None => DEFAULT_COMPANY_ID,
    };

    let confirm_exporting = match ini.get(section, "confirm_exporting") {
        Some(v) => parse_bool_value("confirm_exporting", &v)?,
        None => DEFAULT_CONFIRM_EXPORTING,
    };

    Ok(ServerProfile {
        name: name.to_string(),
        host: require(ini, section, "host")?
            .trim_end_matches('/')
            .to_string(),
        company_id,
        username: require(ini, section, "username")?,
        password: require(ini, section, "password")?,
        user_code: ini.get(section, "user_code").unwrap_or_default(),
        confirm_exporting,
    })
}

/// Apply an INI file's contents to a Config, layering on top of existing values.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> ConfigResult<()> {
    // [workspace] section
    if let Some(root) = ini.get("workspace", "root") {
        config.workspace.root = Some(PathBuf::from(root));
    }

    // [server.*] sections
    let sections: Vec<String> = ini.sections();
    for section_name in sections {
        if let Some(server_name) = section_name.strip_prefix("server.") {
            let profile = parse_server_section(ini, &section_name, server_name)?;
            config.servers.insert(server_name.to_string(), profile);
        }
    }

    Ok(())
}

// =============================================================================
// Override Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> ConfigResult<()> {
    let parts: Vec<&str> = key.splitn(3, '.').collect();

    match parts.as_slice() {
        ["workspace", "root"] => {
            config.workspace.root = Some(PathBuf::from(value));
            Ok(())
        }

        ["server", name, param] => apply_server_override(config, name, param, value),

        _ => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

fn apply_server_override(
    config: &mut Config,
    name: &str,
    param: &str,
    value: &str,
) -> ConfigResult<()> {
    let profile = config
        .servers
        .entry(name.to_string())
        .or_insert_with(|| ServerProfile {
            name: name.to_string(),
            host: String::new(),
            company_id: DEFAULT_COMPANY_ID,
            username: String::new(),
            password: String::new(),
            user_code: String::new(),
            confirm_exporting: DEFAULT_CONFIRM_EXPORTING,
        });

    match param {
        "host" => profile.host = value.trim_end_matches('/').to_string(),
        "company_id" => profile.company_id = parse_u64_value(param, value)?,
        "username" => profile.username = value.to_string(),
        "password" => profile.password = value.to_string(),
        "user_code" => profile.user_code = value.to_string(),
        "confirm_exporting" => profile.confirm_exporting = parse_bool_value(param, value)?,
        _ => {
            return Err(ConfigError::InvalidOverrideKey {
                key: format!("server.{}.{}", name, param),
                message: "unknown parameter".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Entry Point
// =============================================================================

/// Read configuration from the given source.
///
/// Layering order: config file (if any), then individual overrides.
/// A missing config file (unless explicitly specified) yields an empty config.
pub fn read_config(source: &ConfigSource) -> ConfigResult<Config> {
    let mut config = Config {
        workspace: WorkspaceConfig::default(),
        servers: Default::default(),
    };

    if let Some(path) = resolve_config_file(source)? {
        let ini = load_ini(&path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(config)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn source_for(file: &tempfile::NamedTempFile) -> ConfigSource {
        ConfigSource {
            config_file: Some(file.path().to_path_buf()),
            overrides: Vec::new(),
        }
    }

    #[test]
    fn test_read_server_profiles() {
        let file = write_config(
            "[workspace]\n\
             root = /srv/ecm\n\
             \n\
             [server.prod]\n\
             host = https://ecm.example.com/\n\
             company_id = 3\n\
             username = admin\n\
             password = secret\n\
             user_code = adm01\n\
             confirm_exporting = true\n\
             \n\
             [server.dev]\n\
             host = http://localhost:8080\n\
             username = dev\n\
             password = dev\n",
        );

        let config = read_config(&source_for(&file)).unwrap();
        assert_eq!(config.workspace.root, Some(PathBuf::from("/srv/ecm")));
        assert_eq!(config.servers.len(), 2);

        let prod = &config.servers["prod"];
        assert_eq!(prod.name, "prod");
        // Trailing slash is trimmed so URL building can always append paths.
        assert_eq!(prod.host, "https://ecm.example.com");
        assert_eq!(prod.company_id, 3);
        assert!(prod.confirm_exporting);
        assert_eq!(prod.user_code, "adm01");

        let dev = &config.servers["dev"];
        assert_eq!(dev.company_id, 1);
        assert!(!dev.confirm_exporting);
        assert_eq!(dev.user_code, "");
    }

    #[test]
    fn test_missing_required_field() {
        let file = write_config("[server.bad]\nusername = x\npassword = y\n");
        let err = read_config(&source_for(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_invalid_boolean() {
        let file = write_config(
            "[server.bad]\nhost = h\nusername = x\npassword = y\nconfirm_exporting = maybe\n",
        );
        let err = read_config(&source_for(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoolean { .. }));
    }

    #[test]
    fn test_overrides_layer_on_top() {
        let file = write_config(
            "[server.prod]\nhost = https://old.example.com\nusername = a\npassword = b\n",
        );
        let mut source = source_for(&file);
        source.overrides = vec![
            ("server.prod.host".into(), "https://new.example.com".into()),
            ("workspace.root".into(), "/tmp/ws".into()),
        ];

        let config = read_config(&source).unwrap();
        assert_eq!(config.servers["prod"].host, "https://new.example.com");
        assert_eq!(config.servers["prod"].username, "a");
        assert_eq!(config.workspace.root, Some(PathBuf::from("/tmp/ws")));
    }

    #[test]
    fn test_override_unknown_key() {
        let file = write_config("");
        let mut source = source_for(&file);
        source.overrides = vec![("server.prod.color".into(), "blue".into())];
        let err = read_config(&source).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverrideKey { .. }));
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let source = ConfigSource {
            config_file: Some(PathBuf::from("/nonexistent/.ecmsconfig")),
            overrides: Vec::new(),
        };
        let err = read_config(&source).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
