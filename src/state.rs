//! # State Persistence
//!
//! Records which gateway objects a previous apply created, so later runs can
//! distinguish endpoints they own from endpoints that belong to someone else.
//! Teardown only ever touches owned objects.

use crate::endpoint::{Endpoint, HttpMethod};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Durable record of the last successful apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Gateway id the recorded endpoints live under, if an API was ever
    /// provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    /// Endpoints provisioned by the last apply, with their resolved resource
    /// ids and invoke URLs.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl State {
    /// Whether this state claims ownership of the given method/path pair.
    pub fn owns(&self, method: HttpMethod, path: &str) -> bool {
        self.endpoints.iter().any(|e| e.matches(method, path))
    }

    /// Load recorded state from disk. A missing file is an empty state, not
    /// an error: first runs start from nothing.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading state file {}", path.display()))
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("parsing state file {}", path.display()))
    }

    /// Persist this state to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serializing state")?;
        std::fs::write(path, raw)
            .with_context(|| format!("writing state file {}", path.display()))
    }
}
