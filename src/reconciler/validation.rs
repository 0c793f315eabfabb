//! # Endpoint Validation
//!
//! Turns raw declaration entries into validated endpoints: checks the
//! required fields in a fixed order, canonicalizes the method and path,
//! computes the public invoke URL, and rejects routes that already exist on
//! the gateway under someone else's ownership.

use crate::declaration::EndpointSpec;
use crate::endpoint::{invoke_url, Endpoint, HttpMethod};
use crate::error::{InvalidEndpointError, InvalidEndpointReason, ReconcilerError};
use crate::provider::{GatewayProvider, ProviderError};
use crate::reconciler::paths;
use crate::state::State;
use futures::future::join_all;

/// Validate a single raw entry without touching the gateway.
///
/// Checks run in a fixed order so diagnostics are deterministic: method
/// presence, empty path, path presence, method validity, then empty interior
/// segments once the path is canonical. The backend function reference is
/// not inspected here; it is checked when the integration is wired up. The
/// returned endpoint carries the canonical path and the invoke URL it will
/// have once deployed.
pub fn validate_endpoint_object(
    spec: &EndpointSpec,
    api_id: &str,
    region: &str,
    stage: &str,
) -> Result<Endpoint, InvalidEndpointError> {
    let Some(method_raw) = spec.method.as_deref().filter(|m| !m.is_empty()) else {
        return Err(InvalidEndpointError::new(
            InvalidEndpointReason::MissingMethod,
            spec,
        ));
    };

    if spec.path.as_deref() == Some("") {
        return Err(InvalidEndpointError::new(
            InvalidEndpointReason::EmptyPath,
            spec,
        ));
    }

    let Some(path_raw) = spec.path.as_deref() else {
        return Err(InvalidEndpointError::new(
            InvalidEndpointReason::MissingPath,
            spec,
        ));
    };

    let Some(method) = HttpMethod::parse(method_raw) else {
        return Err(InvalidEndpointError::new(
            InvalidEndpointReason::UnsupportedMethod,
            spec,
        ));
    };

    let path = paths::normalize_path(path_raw);

    // an empty segment would provision a different path than the one stored
    if path != "/" && path[1..].split('/').any(str::is_empty) {
        return Err(InvalidEndpointError::new(
            InvalidEndpointReason::EmptyPathSegment,
            spec,
        ));
    }

    let url = invoke_url(api_id, region, stage, &path);

    Ok(Endpoint {
        method,
        path,
        id: None,
        function: spec.function.clone(),
        url,
    })
}

/// Whether the route is already registered on the gateway.
///
/// A route exists when its path resolves to a resource and that resource has
/// the method registered. A missing method is a normal answer here, not an
/// error.
async fn endpoint_exists(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    endpoint: &Endpoint,
) -> Result<bool, ReconcilerError> {
    let Some(resource_id) = paths::resolve_path_id(gateway, api_id, &endpoint.path).await? else {
        return Ok(false);
    };

    match gateway
        .get_method(api_id, &resource_id, endpoint.method.as_str())
        .await
    {
        Ok(()) => Ok(true),
        Err(ProviderError::NotFound) => Ok(false),
        Err(e) => Err(ReconcilerError::remote("GetMethod", e)),
    }
}

/// Validate one entry and enforce route ownership: a route that already
/// exists on the gateway but is not recorded in our state belongs to another
/// declaration, and provisioning over it is refused.
pub async fn validate_endpoint(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    spec: &EndpointSpec,
    state: &State,
    region: &str,
    stage: &str,
) -> Result<Endpoint, ReconcilerError> {
    let endpoint = validate_endpoint_object(spec, api_id, region, stage)?;

    if endpoint_exists(gateway, api_id, &endpoint).await?
        && !state.owns(endpoint.method, &endpoint.path)
    {
        return Err(ReconcilerError::conflict(
            endpoint.method.as_str(),
            &endpoint.path,
        ));
    }

    Ok(endpoint)
}

/// Validate the whole declaration. All entries are checked concurrently and
/// the first failure is reported.
pub async fn validate_endpoints(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    specs: &[EndpointSpec],
    state: &State,
    region: &str,
    stage: &str,
) -> Result<Vec<Endpoint>, ReconcilerError> {
    let checks = specs
        .iter()
        .map(|spec| validate_endpoint(gateway, api_id, spec, state, region, stage));

    join_all(checks).await.into_iter().collect()
}
