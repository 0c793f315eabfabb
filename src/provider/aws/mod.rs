//! # AWS Gateway Provider
//!
//! Implements the gateway control-plane traits on top of the AWS SDK for
//! API Gateway (REST APIs) and Lambda (invoke permissions).
//!
//! Each SDK error is folded into the coarse [`ProviderError`] classes the
//! reconciler understands: missing remote objects become `NotFound`,
//! concurrent-writer collisions become `Conflict`, and everything else is
//! carried as an opaque failure with the operation name attached.

pub mod auth;

use crate::constants;
use crate::provider::{
    FunctionPermissionProvider, GatewayProvider, GatewayResource, ProviderError,
};
use async_trait::async_trait;
use aws_sdk_apigateway::types::IntegrationType;
use aws_sdk_apigateway::Client as ApiGatewayClient;
use aws_sdk_lambda::Client as LambdaClient;
use std::collections::BTreeSet;
use tracing::debug;

/// Gateway provider backed by the real AWS control plane.
pub struct AwsGatewayProvider {
    gateway: ApiGatewayClient,
    lambda: LambdaClient,
    region: String,
}

impl AwsGatewayProvider {
    /// Build a provider for the given region using the default credential
    /// chain.
    pub async fn new(region: &str) -> Self {
        let sdk_config = auth::create_sdk_config(region).await;
        Self {
            gateway: ApiGatewayClient::new(&sdk_config),
            lambda: LambdaClient::new(&sdk_config),
            region: region.to_string(),
        }
    }
}

impl std::fmt::Debug for AwsGatewayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsGatewayProvider")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Wrap a service error that carries no reconciler meaning.
fn opaque<E>(operation: &'static str, err: E) -> ProviderError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ProviderError::Other(anyhow::Error::new(err).context(operation))
}

/// Convert one SDK resource item into the provider-neutral representation.
///
/// Items without an id or path cannot be addressed by the reconciler and are
/// skipped.
fn convert_resource(item: &aws_sdk_apigateway::types::Resource) -> Option<GatewayResource> {
    let id = item.id()?.to_string();
    let path = item.path()?.to_string();
    let parent_id = item.parent_id().map(str::to_string);
    let methods: BTreeSet<String> = item
        .resource_methods()
        .map(|methods| methods.keys().cloned().collect())
        .unwrap_or_default();

    Some(GatewayResource {
        id,
        path,
        parent_id,
        methods,
    })
}

#[async_trait]
impl GatewayProvider for AwsGatewayProvider {
    async fn get_rest_api(&self, api_id: &str) -> Result<(), ProviderError> {
        self.gateway
            .get_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("GetRestApi", err)
                }
            })
    }

    async fn create_rest_api(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, ProviderError> {
        let output = self
            .gateway
            .create_rest_api()
            .name(name)
            .description(description)
            .send()
            .await
            .map_err(|e| opaque("CreateRestApi", e.into_service_error()))?;

        output.id().map(str::to_string).ok_or_else(|| {
            ProviderError::Other(anyhow::anyhow!("CreateRestApi response carried no api id"))
        })
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<(), ProviderError> {
        self.gateway
            .delete_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("DeleteRestApi", err)
                }
            })
    }

    async fn list_resources(&self, api_id: &str) -> Result<Vec<GatewayResource>, ProviderError> {
        let mut resources = Vec::new();
        let mut position: Option<String> = None;

        loop {
            let mut request = self
                .gateway
                .get_resources()
                .rest_api_id(api_id)
                .limit(constants::RESOURCE_PAGE_LIMIT);
            if let Some(marker) = &position {
                request = request.position(marker.clone());
            }

            let page = request.send().await.map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("GetResources", err)
                }
            })?;

            for item in page.items() {
                if let Some(resource) = convert_resource(item) {
                    resources.push(resource);
                } else {
                    debug!("Skipping gateway resource without id or path");
                }
            }

            match page.position() {
                Some(marker) => position = Some(marker.to_string()),
                None => break,
            }
        }

        Ok(resources)
    }

    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String, ProviderError> {
        let output = self
            .gateway
            .create_resource()
            .rest_api_id(api_id)
            .parent_id(parent_id)
            .path_part(path_part)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_conflict_exception() {
                    ProviderError::Conflict
                } else if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("CreateResource", err)
                }
            })?;

        output.id().map(str::to_string).ok_or_else(|| {
            ProviderError::Other(anyhow::anyhow!(
                "CreateResource response carried no resource id"
            ))
        })
    }

    async fn delete_resource(&self, api_id: &str, resource_id: &str) -> Result<(), ProviderError> {
        self.gateway
            .delete_resource()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else if err.is_conflict_exception() {
                    ProviderError::Conflict
                } else {
                    opaque("DeleteResource", err)
                }
            })
    }

    async fn get_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError> {
        self.gateway
            .get_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(method)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("GetMethod", err)
                }
            })
    }

    async fn put_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError> {
        self.gateway
            .put_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(method)
            .authorization_type("NONE")
            .api_key_required(false)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_conflict_exception() {
                    ProviderError::Conflict
                } else if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("PutMethod", err)
                }
            })
    }

    async fn delete_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError> {
        self.gateway
            .delete_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(method)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else if err.is_conflict_exception() {
                    ProviderError::Conflict
                } else {
                    opaque("DeleteMethod", err)
                }
            })
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
        integration_uri: &str,
    ) -> Result<(), ProviderError> {
        self.gateway
            .put_integration()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(method)
            .r#type(IntegrationType::AwsProxy)
            .integration_http_method("POST")
            .uri(integration_uri)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_conflict_exception() {
                    ProviderError::Conflict
                } else if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else {
                    opaque("PutIntegration", err)
                }
            })
    }

    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<String, ProviderError> {
        let output = self
            .gateway
            .create_deployment()
            .rest_api_id(api_id)
            .stage_name(stage)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_not_found_exception() {
                    ProviderError::NotFound
                } else if err.is_conflict_exception() {
                    ProviderError::Conflict
                } else {
                    opaque("CreateDeployment", err)
                }
            })?;

        output.id().map(str::to_string).ok_or_else(|| {
            ProviderError::Other(anyhow::anyhow!(
                "CreateDeployment response carried no deployment id"
            ))
        })
    }
}

#[async_trait]
impl FunctionPermissionProvider for AwsGatewayProvider {
    async fn add_invoke_permission(
        &self,
        function_name: &str,
        source_arn: &str,
        statement_id: &str,
    ) -> Result<(), ProviderError> {
        self.lambda
            .add_permission()
            .function_name(function_name)
            .action(constants::FUNCTION_INVOKE_ACTION)
            .principal(constants::GATEWAY_PERMISSION_PRINCIPAL)
            .source_arn(source_arn)
            .statement_id(statement_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| opaque("AddPermission", e.into_service_error()))
    }
}
