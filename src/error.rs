//! # Reconciler Error Types
//!
//! The fatal error taxonomy for apply/teardown flows: malformed declarations,
//! route ownership conflicts, and remote operation failures. Benign remote
//! conditions (not-found on deletes and existence checks, conflict on method
//! creation) are absorbed by the components and never surface here.

use crate::declaration::EndpointSpec;
use crate::provider::ProviderError;
use thiserror::Error;

/// Why an endpoint declaration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEndpointReason {
    /// No `method` field.
    MissingMethod,
    /// `path` present but empty. Reported distinctly from a missing path so
    /// the two mistakes are tellable apart in diagnostics.
    EmptyPath,
    /// No `path` field.
    MissingPath,
    /// Method outside the fixed allow-list.
    UnsupportedMethod,
    /// An empty segment between slashes, as in `/a//b`. The gateway cannot
    /// host an empty path part, so the route is refused up front.
    EmptyPathSegment,
    /// No `function` field on an endpoint being wired to a backend.
    MissingFunction,
    /// `function` is not a parseable function ARN.
    MalformedFunction,
}

impl InvalidEndpointReason {
    fn describe(self) -> &'static str {
        match self {
            Self::MissingMethod => "missing method property",
            Self::EmptyPath => "endpoint path cannot be an empty string",
            Self::MissingPath => "missing path property",
            Self::UnsupportedMethod => "invalid method",
            Self::EmptyPathSegment => "empty path segment",
            Self::MissingFunction => "missing function property",
            Self::MalformedFunction => "invalid function reference",
        }
    }
}

/// A malformed endpoint declaration, echoing the raw declaration so the user
/// can see exactly which entry was rejected.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidEndpointError {
    pub reason: InvalidEndpointReason,
    message: String,
}

impl InvalidEndpointError {
    /// Build the error for a raw declaration entry. The message embeds the
    /// entry serialized back to JSON, mirroring what the user wrote.
    pub fn new(reason: InvalidEndpointReason, endpoint: &EndpointSpec) -> Self {
        let echo =
            serde_json::to_string(endpoint).unwrap_or_else(|_| String::from("{}"));
        Self {
            reason,
            message: format!("{} for endpoint \"{}\"", reason.describe(), echo),
        }
    }
}

/// Fatal errors surfaced by the reconciliation components.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Malformed user declaration.
    #[error(transparent)]
    InvalidEndpoint(#[from] InvalidEndpointError),

    /// The route exists on the gateway but is not recorded in this
    /// declaration's state, so it belongs to another declaration sharing the
    /// same gateway.
    #[error("endpoint {method} {path} already exists in provider")]
    EndpointConflict { method: String, path: String },

    /// A remote call failed with something other than an expected benign
    /// condition.
    #[error("remote operation {operation} failed")]
    RemoteOperationFailed {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    /// Provisioning or teardown was handed an endpoint whose path segment was
    /// never resolved.
    #[error("endpoint {method} {path} has no resolved path segment")]
    UnresolvedEndpoint { method: String, path: String },
}

impl ReconcilerError {
    /// Wrap a provider failure with the logical operation that issued it.
    pub fn remote(operation: &'static str, source: ProviderError) -> Self {
        Self::RemoteOperationFailed { operation, source }
    }

    pub fn conflict(method: &str, path: &str) -> Self {
        Self::EndpointConflict {
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    pub fn unresolved(method: &str, path: &str) -> Self {
        Self::UnresolvedEndpoint {
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}
