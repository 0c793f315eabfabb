//! # Stage Deployment
//!
//! Publishes the current API configuration to a named stage. Until a
//! deployment is created, provisioned methods and integrations are not
//! reachable through the invoke URL.

use crate::error::ReconcilerError;
use crate::provider::GatewayProvider;
use tracing::info;

/// Create a deployment of the API's current state onto `stage` and return
/// its id. The stage is created on first publish.
pub async fn publish(
    gateway: &dyn GatewayProvider,
    api_id: &str,
    stage: &str,
) -> Result<String, ReconcilerError> {
    let deployment_id = gateway
        .create_deployment(api_id, stage)
        .await
        .map_err(|e| ReconcilerError::remote("CreateDeployment", e))?;

    // TODO: update stage settings (logging, throttling) on already-existing stages
    info!("✅ Published deployment {} to stage {}", deployment_id, stage);
    Ok(deployment_id)
}
