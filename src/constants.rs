//! # Constants
//!
//! Default values and environment variable names used across the reconciler.
//!
//! All defaults can be overridden via environment variables, the declaration
//! file, or CLI flags (in increasing order of precedence).

/// Default AWS region when neither the declaration, environment, nor CLI
/// supplies one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default deployment stage name.
pub const DEFAULT_STAGE: &str = "dev";

/// Default REST API name for declarations that omit `name`.
pub const DEFAULT_API_NAME: &str = "rest-api";

/// Default REST API description for declarations that omit `description`.
pub const DEFAULT_API_DESCRIPTION: &str = "Managed by api-gateway-reconciler";

/// Principal granted invoke permission on backend functions.
pub const GATEWAY_PERMISSION_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// IAM action granted to the gateway principal.
pub const FUNCTION_INVOKE_ACTION: &str = "lambda:InvokeFunction";

/// Page size for resource listings. 500 is the API Gateway maximum.
pub const RESOURCE_PAGE_LIMIT: i32 = 500;

/// Environment variable supplying the AWS region.
pub const ENV_REGION: &str = "AWS_REGION";

/// Environment variable supplying the deployment stage.
pub const ENV_STAGE: &str = "AGW_STAGE";

/// Environment variable routing control-plane calls to an alternate endpoint
/// (local gateway emulators, mock servers).
pub const ENV_GATEWAY_ENDPOINT: &str = "AGW_ENDPOINT_URL";

/// Environment variable supplying the declaration file path.
pub const ENV_DECLARATION_FILE: &str = "AGW_DECLARATION_FILE";

/// Environment variable supplying the state file path.
pub const ENV_STATE_FILE: &str = "AGW_STATE_FILE";

/// Default declaration file read by `agwctl` when `--file` is omitted.
pub const DEFAULT_DECLARATION_FILE: &str = "gateway.yaml";

/// Default state file read and written by `agwctl` when `--state` is omitted.
pub const DEFAULT_STATE_FILE: &str = "agwctl.state.json";
