//! # Endpoint Model
//!
//! Validated endpoint records and the pieces they are built from: the HTTP
//! method allow-list, the backend function reference, and the public invoke
//! URL format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods accepted on a gateway path segment.
///
/// `Any` is the gateway catch-all verb. The set is fixed; declarations using
/// anything else are rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Any,
}

impl HttpMethod {
    /// Parse a method name case-insensitively against the allow-list.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "ANY" => Some(Self::Any),
            _ => None,
        }
    }

    /// Canonical uppercase name, as registered on the gateway.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated endpoint: canonical method and path, computed invoke URL, and
/// the remote path segment id once resolution has run.
///
/// This is the record persisted into [`crate::state::State`] after a
/// successful apply, so the serialized field names are part of the state file
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Canonical uppercase HTTP method.
    pub method: HttpMethod,
    /// Canonical path: leading slash, no trailing slash unless the path is
    /// exactly `/`.
    pub path: String,
    /// Remote path segment identifier. Absent until path resolution runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Backend function reference (Lambda function ARN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Public invoke URL for this route on the deployed stage.
    pub url: String,
}

impl Endpoint {
    /// Whether this endpoint registers the same route as `method` + `path`.
    pub fn matches(&self, method: HttpMethod, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

/// Public invoke URL for a route, reproduced exactly in consumer-facing
/// output: `https://{apiId}.execute-api.{region}.amazonaws.com/{stage}{path}`.
pub fn invoke_url(api_id: &str, region: &str, stage: &str, path: &str) -> String {
    format!("https://{api_id}.execute-api.{region}.amazonaws.com/{stage}{path}")
}

/// Region, account, and function name decoded from a Lambda function ARN.
///
/// Format: `arn:aws:lambda:{region}:{account}:function:{name}[:qualifier]`.
/// Only the three components the integration needs are kept; a trailing
/// qualifier is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArn {
    pub region: String,
    pub account_id: String,
    pub name: String,
}

impl FunctionArn {
    /// Decode a function reference. Returns `None` when the reference does
    /// not carry the expected colon-separated components.
    pub fn parse(reference: &str) -> Option<Self> {
        let parts: Vec<&str> = reference.split(':').collect();
        if parts.len() < 7 {
            return None;
        }
        let (region, account_id, name) = (parts[3], parts[4], parts[6]);
        if region.is_empty() || account_id.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            region: region.to_string(),
            account_id: account_id.to_string(),
            name: name.to_string(),
        })
    }
}
