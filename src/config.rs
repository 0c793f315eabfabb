//! # Tool Configuration
//!
//! File-path settings loaded from environment variables with defaults.
//! Command-line flags take precedence over everything here; the region and
//! stage precedence chain lives with declaration resolution.

use crate::constants;
use std::path::PathBuf;

/// Paths the tool reads and writes.
///
/// All settings have sensible defaults and can be overridden via environment
/// variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Declaration document describing the desired endpoints.
    pub declaration_file: PathBuf,
    /// State record from the previous apply.
    pub state_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            declaration_file: PathBuf::from(constants::DEFAULT_DECLARATION_FILE),
            state_file: PathBuf::from(constants::DEFAULT_STATE_FILE),
        }
    }
}

impl Settings {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            declaration_file: PathBuf::from(env_var_or_default(
                constants::ENV_DECLARATION_FILE,
                constants::DEFAULT_DECLARATION_FILE.to_string(),
            )),
            state_file: PathBuf::from(env_var_or_default(
                constants::ENV_STATE_FILE,
                constants::DEFAULT_STATE_FILE.to_string(),
            )),
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read an environment variable, treating empty values as absent.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
