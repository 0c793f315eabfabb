//! # Route Teardown
//!
//! Removes methods and path segments for endpoints this declaration owns.
//! Deletion is conservative: a path segment only goes away once nothing is
//! left on it, so prefixes shared with routes owned by other declarations
//! stay up.

use crate::endpoint::Endpoint;
use crate::error::ReconcilerError;
use crate::provider::{GatewayProvider, ProviderError};
use crate::reconciler::paths;
use futures::future::join_all;
use tracing::debug;

/// Remove the endpoint's method from its path segment. An already-absent
/// method is the normal case after a partial teardown and is absorbed.
pub async fn remove_method(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    endpoint: &Endpoint,
) -> Result<(), ReconcilerError> {
    let Some(resource_id) = endpoint.id.as_deref() else {
        return Err(ReconcilerError::unresolved(
            endpoint.method.as_str(),
            &endpoint.path,
        ));
    };

    match gateway
        .delete_method(api_id, resource_id, endpoint.method.as_str())
        .await
    {
        Ok(()) => {
            debug!("Removed {} from {}", endpoint.method, endpoint.path);
            Ok(())
        }
        Err(ProviderError::NotFound) => Ok(()),
        Err(e) => Err(ReconcilerError::remote("DeleteMethod", e)),
    }
}

/// Remove methods for all endpoints concurrently.
pub async fn remove_methods(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    endpoints: &[Endpoint],
) -> Result<(), ReconcilerError> {
    let ops = endpoints
        .iter()
        .map(|endpoint| remove_method(gateway, api_id, endpoint));

    join_all(ops).await.into_iter().collect()
}

/// Delete a single path segment. Absence is absorbed: a concurrent teardown
/// may have removed it first.
async fn remove_resource(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    resource_id: &str,
) -> Result<(), ReconcilerError> {
    match gateway.delete_resource(api_id, resource_id).await {
        Ok(()) => Ok(()),
        Err(ProviderError::NotFound) => Ok(()),
        Err(e) => Err(ReconcilerError::remote("DeleteResource", e)),
    }
}

/// Delete the path segments belonging to the given endpoints, in passes.
///
/// A segment is only deletable once it has no methods and no child segments;
/// each pass deletes every segment that qualifies against a fresh listing,
/// then the tree is re-examined, since deleting leaves can make their
/// parents deletable. The loop stops on the first pass that deletes nothing.
pub async fn remove_resources(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    endpoints: &[Endpoint],
) -> Result<(), ReconcilerError> {
    loop {
        let resources = paths::fetch_resources(gateway, api_id).await?;

        let mut deletable: Vec<&str> = Vec::new();
        for endpoint in endpoints {
            let Some(resource_id) = endpoint.id.as_deref() else {
                continue;
            };
            let Some(resource) = resources.iter().find(|r| r.id == resource_id) else {
                continue;
            };
            let has_children = resources
                .iter()
                .any(|r| r.parent_id.as_deref() == Some(resource_id));

            if resource.methods.is_empty() && !has_children {
                deletable.push(resource_id);
            }
        }

        if deletable.is_empty() {
            return Ok(());
        }

        deletable.sort_unstable();
        deletable.dedup();
        debug!("Deleting {} path segment(s)", deletable.len());

        let ops = deletable
            .iter()
            .map(|resource_id| remove_resource(gateway, api_id, resource_id));
        join_all(ops)
            .await
            .into_iter()
            .collect::<Result<(), ReconcilerError>>()?;
    }
}
