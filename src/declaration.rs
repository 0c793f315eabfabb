//! # Declaration Files
//!
//! The desired-state input: a YAML or JSON document naming the gateway and
//! the endpoints it should serve. Endpoint entries are kept raw here, exactly
//! as the user wrote them; semantic checks happen in the reconciler's
//! validation pass so rejects can echo the original entry back.

use crate::config;
use crate::constants;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One raw endpoint entry. All fields optional so malformed entries survive
/// deserialization and reach validation, where they are rejected with a
/// message that quotes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// A declaration document as read from disk, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,
}

/// Command-line values that take precedence over the declaration document.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub region: Option<String>,
    pub stage: Option<String>,
}

/// A fully resolved declaration: every field has a value and the region and
/// stage have passed format validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub description: String,
    pub region: String,
    pub stage: String,
    pub endpoints: Vec<EndpointSpec>,
}

impl DeclarationFile {
    /// Load a declaration document, dispatching on file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading declaration file {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing declaration file {}", path.display())),
            "json" => serde_json::from_str(&raw)
                .with_context(|| format!("parsing declaration file {}", path.display())),
            other => bail!(
                "unsupported declaration format '{}' for {} (expected yaml, yml or json)",
                other,
                path.display()
            ),
        }
    }

    /// Resolve defaults and validate the gateway-level fields.
    ///
    /// Region and stage resolve with the precedence: command-line flag, then
    /// declaration field, then environment, then built-in default.
    pub fn resolve(self, overrides: &Overrides) -> Result<Declaration> {
        let region = overrides
            .region
            .clone()
            .or(self.region)
            .or_else(|| config::env_var(constants::ENV_REGION))
            .unwrap_or_else(|| constants::DEFAULT_REGION.to_string())
            .trim()
            .to_string();

        let stage = overrides
            .stage
            .clone()
            .or(self.stage)
            .or_else(|| config::env_var(constants::ENV_STAGE))
            .unwrap_or_else(|| constants::DEFAULT_STAGE.to_string())
            .trim()
            .to_string();

        validate_region(&region)?;
        validate_stage(&stage)?;

        Ok(Declaration {
            name: self
                .name
                .unwrap_or_else(|| constants::DEFAULT_API_NAME.to_string()),
            description: self
                .description
                .unwrap_or_else(|| constants::DEFAULT_API_DESCRIPTION.to_string()),
            region,
            stage,
            endpoints: self.endpoints,
        })
    }
}

/// Validate a region against the official AWS region formats.
/// Supports standard regions (us-east-1) and special regions (us-gov-west-1,
/// cn-north-1), plus `local` for gateway emulators.
fn validate_region(region: &str) -> Result<()> {
    let region_trimmed = region.trim().to_lowercase();

    if region_trimmed.is_empty() {
        return Err(anyhow::anyhow!("region cannot be empty"));
    }

    // Standard region pattern: [a-z]{2}-[a-z]+-[0-9]+
    let standard_pattern = Regex::new(r"^[a-z]{2}-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    // Gov region pattern: [a-z]{2}-gov-[a-z]+-[0-9]+
    let gov_pattern = Regex::new(r"^[a-z]{2}-gov-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    // ISO region pattern: [a-z]{2}-iso-[a-z]+-[0-9]+
    let iso_pattern = Regex::new(r"^[a-z]{2}-iso-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    // China region pattern: cn-[a-z]+-[0-9]+
    let china_pattern = Regex::new(r"^cn-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    // Local pattern (for development against a gateway emulator)
    let local_pattern =
        Regex::new(r"^local$").map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    if standard_pattern.is_match(&region_trimmed)
        || gov_pattern.is_match(&region_trimmed)
        || iso_pattern.is_match(&region_trimmed)
        || china_pattern.is_match(&region_trimmed)
        || local_pattern.is_match(&region_trimmed)
    {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "region '{region}' must be a valid AWS region code (e.g., 'us-east-1', 'eu-west-1', 'us-gov-west-1', 'cn-north-1')"
        ))
    }
}

/// Validate a deployment stage name: alphanumeric, hyphens and underscores,
/// up to 128 characters.
fn validate_stage(stage: &str) -> Result<()> {
    if stage.is_empty() {
        return Err(anyhow::anyhow!("stage cannot be empty"));
    }

    let stage_pattern = Regex::new(r"^[a-zA-Z0-9_-]{1,128}$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    if stage_pattern.is_match(stage) {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "stage '{stage}' must contain only alphanumeric characters, hyphens and underscores"
        ))
    }
}
