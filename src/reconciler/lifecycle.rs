//! # API Lifecycle
//!
//! Creates the REST API when no usable one is recorded, re-adopts the
//! recorded one when it still exists, and destroys it on removal.

use crate::error::ReconcilerError;
use crate::provider::{GatewayProvider, ProviderError};
use tracing::{debug, info};

/// Outcome of [`ensure_api`]: the API to reconcile against and whether this
/// run created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredApi {
    pub api_id: String,
    pub created: bool,
}

/// Whether the recorded API still exists remotely. An empty or absent record
/// means there is nothing to check.
pub async fn api_exists(
    gateway: &dyn GatewayProvider,
    api_id: Option<&str>,
) -> Result<bool, ReconcilerError> {
    let Some(api_id) = api_id.filter(|id| !id.is_empty()) else {
        return Ok(false);
    };

    match gateway.get_rest_api(api_id).await {
        Ok(()) => Ok(true),
        Err(ProviderError::NotFound) => Ok(false),
        Err(e) => Err(ReconcilerError::remote("GetRestApi", e)),
    }
}

/// Create a fresh REST API and return its id.
pub async fn create_api(
    gateway: &dyn GatewayProvider,
    name: &str,
    description: &str,
) -> Result<String, ReconcilerError> {
    gateway
        .create_rest_api(name, description)
        .await
        .map_err(|e| ReconcilerError::remote("CreateRestApi", e))
}

/// Reuse the recorded API if it still exists, otherwise create a new one.
/// An API deleted out from under us is recreated from scratch, not treated
/// as an error.
pub async fn ensure_api(
    gateway: &dyn GatewayProvider,
    recorded: Option<&str>,
    name: &str,
    description: &str,
) -> Result<EnsuredApi, ReconcilerError> {
    if api_exists(gateway, recorded).await? {
        let api_id = recorded.unwrap_or_default().to_string();
        debug!("Reusing existing REST API {}", api_id);
        return Ok(EnsuredApi {
            api_id,
            created: false,
        });
    }

    let api_id = create_api(gateway, name, description).await?;
    info!("✅ Created REST API {} ({})", api_id, name);
    Ok(EnsuredApi {
        api_id,
        created: true,
    })
}

/// Best-effort destruction of the whole API. Every failure is absorbed:
/// removal is expected to converge even when the API is already gone or the
/// remote side is briefly unhappy.
pub async fn remove_api(gateway: &dyn GatewayProvider, api_id: &str) {
    match gateway.delete_rest_api(api_id).await {
        Ok(()) => info!("❌ Deleted REST API {}", api_id),
        Err(e) => debug!("Ignoring failure deleting REST API {}: {}", api_id, e),
    }
}
