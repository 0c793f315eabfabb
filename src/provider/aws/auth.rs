//! # AWS SDK Configuration
//!
//! Builds the shared SDK config for the gateway and function clients using
//! the default credential chain.

use crate::constants;
use aws_config::SdkConfig;
use tracing::info;

/// Create the AWS SDK config for the given region.
///
/// Honors `AGW_ENDPOINT_URL` to route control-plane requests to an alternate
/// endpoint (local gateway emulators, mock servers) instead of real AWS.
pub async fn create_sdk_config(region: &str) -> SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    if let Ok(endpoint) = std::env::var(constants::ENV_GATEWAY_ENDPOINT) {
        info!(
            "Endpoint override enabled: routing gateway requests to {}",
            endpoint
        );
        builder = builder.endpoint_url(&endpoint);
    }

    builder.load().await
}
