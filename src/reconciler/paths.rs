//! # Path Resolution
//!
//! Maps declared endpoint paths onto the gateway's resource tree. Paths are
//! looked up by full canonical path; missing segments are created one level
//! at a time from the root down, so `/a/b/c` materializes as `a`, then
//! `a/b`, then `a/b/c`, reusing any ancestors that already exist.

use crate::endpoint::Endpoint;
use crate::error::ReconcilerError;
use crate::provider::{GatewayProvider, GatewayResource, ProviderError};
use tracing::debug;

/// Canonicalize a declared path: ensure a leading slash and strip a single
/// trailing slash. The bare root path `/` is left untouched.
pub fn normalize_path(raw: &str) -> String {
    if raw == "/" {
        return raw.to_string();
    }
    let mut path = if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    };
    if path.ends_with('/') {
        path.truncate(path.len() - 1);
    }
    path
}

/// Fetch the full resource tree for an API.
// TODO: this refetches the whole tree at every level of a walk; cache it
// within a single apply if the latency shows up.
pub async fn fetch_resources(
    gateway: &dyn GatewayProvider,
    api_id: &str,
) -> Result<Vec<GatewayResource>, ReconcilerError> {
    gateway
        .list_resources(api_id)
        .await
        .map_err(|e| ReconcilerError::remote("GetResources", e))
}

/// Find a resource by its full path.
pub fn find_by_path<'a>(
    resources: &'a [GatewayResource],
    path: &str,
) -> Option<&'a GatewayResource> {
    resources.iter().find(|r| r.path == path)
}

/// Resolve a full path to its resource id, if the resource exists right now.
pub async fn resolve_path_id(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    path: &str,
) -> Result<Option<String>, ReconcilerError> {
    let resources = fetch_resources(gateway, api_id).await?;
    Ok(find_by_path(&resources, path).map(|r| r.id.clone()))
}

/// Resolve the root resource id. Every REST API carries a `/` resource from
/// creation, so a missing root means the API itself is gone.
pub async fn root_resource_id(
    gateway: &dyn GatewayProvider,
    api_id: &str,
) -> Result<String, ReconcilerError> {
    resolve_path_id(gateway, api_id, "/")
        .await?
        .ok_or_else(|| ReconcilerError::remote("ResolveRootResource", ProviderError::NotFound))
}

/// Ensure every segment of `path` exists, creating the missing ones, and
/// return the id of the deepest segment.
///
/// Each level is re-resolved against a fresh listing before anything is
/// created, so segments added by a concurrent writer between levels are
/// picked up rather than collided with.
pub async fn create_path(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    path: &str,
) -> Result<String, ReconcilerError> {
    if path == "/" {
        return root_resource_id(gateway, api_id).await;
    }

    if let Some(id) = resolve_path_id(gateway, api_id, path).await? {
        return Ok(id);
    }

    let mut parent_id = root_resource_id(gateway, api_id).await?;
    let mut prefix = String::with_capacity(path.len());

    for part in path.split('/').filter(|p| !p.is_empty()) {
        prefix.push('/');
        prefix.push_str(part);

        parent_id = match resolve_path_id(gateway, api_id, &prefix).await? {
            Some(id) => id,
            None => create_segment(gateway, api_id, &parent_id, part, &prefix).await?,
        };
    }

    Ok(parent_id)
}

/// Create one segment under its parent, adopting the existing resource when
/// a concurrent writer created the same segment first.
async fn create_segment(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    parent_id: &str,
    part: &str,
    prefix: &str,
) -> Result<String, ReconcilerError> {
    match gateway.create_resource(api_id, parent_id, part).await {
        Ok(id) => {
            debug!("Created path segment {} ({})", prefix, id);
            Ok(id)
        }
        Err(ProviderError::Conflict) => {
            debug!("Segment {} appeared concurrently, adopting it", prefix);
            resolve_path_id(gateway, api_id, prefix)
                .await?
                .ok_or_else(|| ReconcilerError::remote("CreateResource", ProviderError::Conflict))
        }
        Err(e) => Err(ReconcilerError::remote("CreateResource", e)),
    }
}

/// Resolve paths for a batch of endpoints, filling in each endpoint's
/// resource id.
///
/// Runs sequentially on purpose: two endpoints sharing a prefix must not
/// race each other into creating it twice.
pub async fn create_paths(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    mut endpoints: Vec<Endpoint>,
) -> Result<Vec<Endpoint>, ReconcilerError> {
    for endpoint in &mut endpoints {
        let id = create_path(gateway, api_id, &endpoint.path).await?;
        endpoint.id = Some(id);
    }
    Ok(endpoints)
}
