//! # Gateway Providers
//!
//! The narrow interfaces the reconciler drives the remote gateway through.
//!
//! Two remote services sit behind these traits: the gateway control plane
//! (REST API, resource tree, methods, integrations, deployments) and the
//! function-permission service that lets the gateway invoke backend
//! functions. Components depend only on the traits; the AWS implementation
//! lives in [`aws`].

pub mod aws;

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

pub use aws::AwsGatewayProvider;

/// Outcome classification for remote calls.
///
/// `NotFound` and `Conflict` are the two conditions individual components may
/// treat as benign; everything else is opaque and fatal to the caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The addressed remote entity does not exist.
    #[error("not found")]
    NotFound,
    /// The remote entity already exists or is in a conflicting state.
    #[error("conflict")]
    Conflict,
    /// Any other remote failure, with the underlying cause attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One node of the gateway's hierarchical path tree, as reported by the
/// remote side. The tree is re-fetched before every existence decision; it is
/// never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResource {
    /// Remote identifier of this path segment.
    pub id: String,
    /// Full path of the segment, `/` for the root.
    pub path: String,
    /// Identifier of the parent segment. Absent only for the root.
    pub parent_id: Option<String>,
    /// HTTP methods currently registered on this segment.
    pub methods: BTreeSet<String>,
}

/// Control-plane operations on the remote gateway.
///
/// Request/response shapes are the contract; the wire format belongs to the
/// implementation. Every method reports benign conditions through
/// [`ProviderError::NotFound`] / [`ProviderError::Conflict`] rather than
/// deciding for the caller whether they matter.
#[async_trait]
pub trait GatewayProvider: Send + Sync {
    /// Check that the REST API exists. `NotFound` means it does not.
    async fn get_rest_api(&self, api_id: &str) -> Result<(), ProviderError>;

    /// Create a REST API and return its identifier.
    async fn create_rest_api(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, ProviderError>;

    /// Delete the REST API and everything under it.
    async fn delete_rest_api(&self, api_id: &str) -> Result<(), ProviderError>;

    /// Fetch the full current resource tree.
    async fn list_resources(&self, api_id: &str) -> Result<Vec<GatewayResource>, ProviderError>;

    /// Create a path segment under `parent_id` and return its identifier.
    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String, ProviderError>;

    /// Delete a path segment.
    async fn delete_resource(
        &self,
        api_id: &str,
        resource_id: &str,
    ) -> Result<(), ProviderError>;

    /// Check that a method is registered on a path segment.
    async fn get_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError>;

    /// Register a method on a path segment with open authorization and no
    /// API key requirement.
    async fn put_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError>;

    /// Remove a method registration from a path segment.
    async fn delete_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError>;

    /// Wire a proxy integration from a method to a backend invocation URI.
    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
        integration_uri: &str,
    ) -> Result<(), ProviderError>;

    /// Snapshot the current configuration into a deployment bound to the
    /// named stage, returning the deployment identifier.
    async fn create_deployment(
        &self,
        api_id: &str,
        stage: &str,
    ) -> Result<String, ProviderError>;
}

/// Permission grants on the remote function service.
#[async_trait]
pub trait FunctionPermissionProvider: Send + Sync {
    /// Allow the gateway principal to invoke `function_name`, scoped by
    /// `source_arn`. The statement id must be unique per grant; the remote
    /// side offers no idempotent upsert.
    async fn add_invoke_permission(
        &self,
        function_name: &str,
        source_arn: &str,
        statement_id: &str,
    ) -> Result<(), ProviderError>;
}
