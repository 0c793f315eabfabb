//! # Reconciliation Engine
//!
//! Drives a declaration to convergence against the remote gateway: ensures
//! the API exists, validates and provisions every declared endpoint,
//! publishes the stage, then prunes routes that were dropped from the
//! declaration since the previous apply.
//!
//! Apply is additive-first and repeatable: objects that already exist are
//! adopted, never recreated, and a re-apply of an unchanged declaration
//! performs no writes besides the stage publish and permission grants.

pub mod deployment;
pub mod lifecycle;
pub mod paths;
pub mod provision;
pub mod teardown;
pub mod validation;

use crate::declaration::Declaration;
use crate::endpoint::Endpoint;
use crate::error::ReconcilerError;
use crate::provider::{FunctionPermissionProvider, GatewayProvider};
use crate::state::State;
use tracing::info;

/// Result of a successful apply, carrying everything the caller needs to
/// report and to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The API all endpoints were reconciled under.
    pub api_id: String,
    /// Deployment published at the end of the run.
    pub deployment_id: String,
    /// Whether this run created the API rather than adopting a recorded one.
    pub created_api: bool,
    /// Every declared endpoint, resolved: resource ids filled in and invoke
    /// URLs computed.
    pub endpoints: Vec<Endpoint>,
}

impl ApplyOutcome {
    /// The state record to persist for the next run.
    pub fn into_state(self) -> State {
        State {
            api_id: Some(self.api_id),
            endpoints: self.endpoints,
        }
    }
}

/// The reconciliation engine, generic over the gateway and function
/// permission backends.
pub struct Reconciler<'a> {
    gateway: &'a dyn GatewayProvider,
    functions: &'a dyn FunctionPermissionProvider,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        gateway: &'a dyn GatewayProvider,
        functions: &'a dyn FunctionPermissionProvider,
    ) -> Self {
        Self { gateway, functions }
    }

    /// Converge the gateway onto the declaration.
    ///
    /// Order matters: validation needs the API id for invoke URLs and the
    /// ownership check, provisioning needs resolved path ids, and pruning
    /// runs last so a failed provision never deletes previously working
    /// routes.
    pub async fn apply(
        &self,
        declaration: &Declaration,
        state: &State,
    ) -> Result<ApplyOutcome, ReconcilerError> {
        info!(
            "📋 Applying declaration '{}' ({} endpoint(s), stage {})",
            declaration.name,
            declaration.endpoints.len(),
            declaration.stage
        );

        let ensured = lifecycle::ensure_api(
            self.gateway,
            state.api_id.as_deref(),
            &declaration.name,
            &declaration.description,
        )
        .await?;
        let api_id = ensured.api_id;

        let validated = validation::validate_endpoints(
            self.gateway,
            &api_id,
            &declaration.endpoints,
            state,
            &declaration.region,
            &declaration.stage,
        )
        .await?;

        let endpoints = paths::create_paths(self.gateway, &api_id, validated).await?;
        provision::create_methods(self.gateway, &api_id, &endpoints).await?;
        provision::create_integrations(self.gateway, self.functions, &api_id, &endpoints).await?;

        let deployment_id = deployment::publish(self.gateway, &api_id, &declaration.stage).await?;

        let dropped = dropped_endpoints(state, &endpoints);
        if !dropped.is_empty() {
            info!("Pruning {} endpoint(s) no longer declared", dropped.len());
            teardown::remove_methods(self.gateway, &api_id, &dropped).await?;
            teardown::remove_resources(self.gateway, &api_id, &dropped).await?;
        }

        info!("✅ Apply complete: api {}", api_id);
        Ok(ApplyOutcome {
            api_id,
            deployment_id,
            created_api: ensured.created,
            endpoints,
        })
    }

    /// Tear the whole API down, best-effort, and return the empty state.
    ///
    /// Removal never fails: an API that is already gone, or a remote error
    /// on delete, still yields a clean slate locally.
    pub async fn remove(&self, state: &State) -> State {
        match state.api_id.as_deref().filter(|id| !id.is_empty()) {
            Some(api_id) => lifecycle::remove_api(self.gateway, api_id).await,
            None => info!("No API recorded, nothing to remove"),
        }
        State::default()
    }
}

/// Endpoints present in the previous state but absent from the current
/// declaration.
fn dropped_endpoints(state: &State, desired: &[Endpoint]) -> Vec<Endpoint> {
    state
        .endpoints
        .iter()
        .filter(|previous| !desired.iter().any(|e| e.matches(previous.method, &previous.path)))
        .cloned()
        .collect()
}
