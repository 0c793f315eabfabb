//! # Method and Integration Provisioning
//!
//! Registers the HTTP method on each resolved path segment, wires it to the
//! backend function as a proxy integration, and grants the gateway permission
//! to invoke the function.

use crate::declaration::EndpointSpec;
use crate::endpoint::{Endpoint, FunctionArn};
use crate::error::{InvalidEndpointError, InvalidEndpointReason, ReconcilerError};
use crate::provider::{FunctionPermissionProvider, GatewayProvider, ProviderError};
use futures::future::join_all;
use tracing::debug;
use uuid::Uuid;

/// Register the endpoint's method on its path segment. A method that is
/// already registered reports a conflict, which is the normal re-apply case
/// and is absorbed.
pub async fn create_method(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    endpoint: &Endpoint,
) -> Result<(), ReconcilerError> {
    let resource_id = resolved_id(endpoint)?;

    match gateway
        .put_method(api_id, resource_id, endpoint.method.as_str())
        .await
    {
        Ok(()) => {
            debug!("Registered {} on {}", endpoint.method, endpoint.path);
            Ok(())
        }
        Err(ProviderError::Conflict) => Ok(()),
        Err(e) => Err(ReconcilerError::remote("PutMethod", e)),
    }
}

/// Register methods for all endpoints concurrently.
pub async fn create_methods(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    endpoints: &[Endpoint],
) -> Result<(), ReconcilerError> {
    let ops = endpoints
        .iter()
        .map(|endpoint| create_method(gateway, api_id, endpoint));

    join_all(ops).await.into_iter().collect()
}

/// Wire one endpoint to its backend function and grant the gateway invoke
/// permission on it.
///
/// The permission statement gets a fresh random suffix on every apply, so
/// re-applies add statements rather than collide on an existing id.
pub async fn create_integration(
    gateway: &dyn GatewayProvider,
    functions: &dyn FunctionPermissionProvider,
    api_id: &str,
    endpoint: &Endpoint,
) -> Result<(), ReconcilerError> {
    let resource_id = resolved_id(endpoint)?;
    let (arn, function) = function_reference(endpoint)?;

    let uri = integration_uri(&arn.region, function);
    gateway
        .put_integration(api_id, resource_id, endpoint.method.as_str(), &uri)
        .await
        .map_err(|e| ReconcilerError::remote("PutIntegration", e))?;

    // TODO: handle functions living in a different region than the gateway
    let source_arn = format!(
        "arn:aws:execute-api:{}:{}:{}/*/*",
        arn.region, arn.account_id, api_id
    );
    let token = Uuid::new_v4().simple().to_string();
    let statement_id = format!("{}-http-{}", arn.name, &token[..8]);

    functions
        .add_invoke_permission(&arn.name, &source_arn, &statement_id)
        .await
        .map_err(|e| ReconcilerError::remote("AddPermission", e))?;

    debug!(
        "Integrated {} {} with function {}",
        endpoint.method, endpoint.path, arn.name
    );
    Ok(())
}

/// Wire integrations for all endpoints concurrently.
pub async fn create_integrations(
    gateway: &dyn GatewayProvider,
    functions: &dyn FunctionPermissionProvider,
    api_id: &str,
    endpoints: &[Endpoint],
) -> Result<(), ReconcilerError> {
    let ops = endpoints
        .iter()
        .map(|endpoint| create_integration(gateway, functions, api_id, endpoint));

    join_all(ops).await.into_iter().collect()
}

/// Proxy integration URI for a backend function, addressed through the
/// function's own region.
fn integration_uri(region: &str, function_arn: &str) -> String {
    format!(
        "arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{function_arn}/invocations"
    )
}

fn resolved_id(endpoint: &Endpoint) -> Result<&str, ReconcilerError> {
    endpoint
        .id
        .as_deref()
        .ok_or_else(|| ReconcilerError::unresolved(endpoint.method.as_str(), &endpoint.path))
}

/// Extract the parsed function ARN together with the raw reference, which
/// the integration URI reproduces verbatim (qualifier included).
fn function_reference(endpoint: &Endpoint) -> Result<(FunctionArn, &str), ReconcilerError> {
    let echo = || EndpointSpec {
        method: Some(endpoint.method.as_str().to_string()),
        path: Some(endpoint.path.clone()),
        function: endpoint.function.clone(),
    };

    let Some(function) = endpoint.function.as_deref().filter(|f| !f.is_empty()) else {
        return Err(
            InvalidEndpointError::new(InvalidEndpointReason::MissingFunction, &echo()).into(),
        );
    };

    match FunctionArn::parse(function) {
        Some(arn) => Ok((arn, function)),
        None => Err(
            InvalidEndpointError::new(InvalidEndpointReason::MalformedFunction, &echo()).into(),
        ),
    }
}
