//! Shared in-memory gateway fake for integration tests.
//!
//! Implements both provider traits over a mutex-guarded tree, with
//! deterministic ids (`api1`, `r1`, `dep1`, ...), call recording for
//! ordering assertions, and single-shot failure injection per operation.

#![allow(dead_code, reason = "each test target uses a subset of the helpers")]

use api_gateway_reconciler::provider::{
    FunctionPermissionProvider, GatewayProvider, GatewayResource, ProviderError,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Debug, Clone, Default)]
struct MethodRecord {
    integration_uri: Option<String>,
}

#[derive(Debug, Clone)]
struct ResourceRecord {
    id: String,
    path: String,
    parent_id: Option<String>,
    methods: BTreeMap<String, MethodRecord>,
}

#[derive(Debug, Clone)]
struct ApiRecord {
    name: String,
    description: String,
    resources: BTreeMap<String, ResourceRecord>,
}

#[derive(Debug, Default)]
struct GatewayState {
    apis: BTreeMap<String, ApiRecord>,
    api_counter: usize,
    resource_counter: usize,
    deployment_counter: usize,

    create_resource_calls: Vec<(String, String)>,
    put_method_calls: Vec<(String, String)>,
    deleted_methods: Vec<(String, String)>,
    deleted_resources: Vec<String>,
    deployments: Vec<(String, String)>,
    permissions: Vec<(String, String, String)>,
    list_calls: usize,

    fail_next: BTreeMap<&'static str, ProviderError>,
    conflict_on_next_create: bool,
}

impl GatewayState {
    fn take_fail(&mut self, op: &'static str) -> Option<ProviderError> {
        self.fail_next.remove(op)
    }

    fn next_resource_id(&mut self) -> String {
        self.resource_counter += 1;
        format!("r{}", self.resource_counter)
    }

    fn insert_api(&mut self, api_id: &str, name: &str, description: &str) {
        let root_id = self.next_resource_id();
        let mut resources = BTreeMap::new();
        resources.insert(
            root_id.clone(),
            ResourceRecord {
                id: root_id,
                path: "/".to_string(),
                parent_id: None,
                methods: BTreeMap::new(),
            },
        );
        self.apis.insert(
            api_id.to_string(),
            ApiRecord {
                name: name.to_string(),
                description: description.to_string(),
                resources,
            },
        );
    }

    fn find_by_path(&self, api_id: &str, path: &str) -> Option<&ResourceRecord> {
        self.apis
            .get(api_id)?
            .resources
            .values()
            .find(|r| r.path == path)
    }

    /// Insert the whole chain for `path`, reusing existing segments. Returns
    /// the leaf id. Does not touch the call logs.
    fn materialize_path(&mut self, api_id: &str, path: &str) -> String {
        let root_id = self
            .find_by_path(api_id, "/")
            .map(|r| r.id.clone())
            .expect("api must be seeded before resources");

        if path == "/" {
            return root_id;
        }

        let mut parent_id = root_id;
        let mut prefix = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            prefix.push('/');
            prefix.push_str(part);

            if let Some(existing) = self.find_by_path(api_id, &prefix) {
                parent_id = existing.id.clone();
                continue;
            }

            let id = self.next_resource_id();
            let record = ResourceRecord {
                id: id.clone(),
                path: prefix.clone(),
                parent_id: Some(parent_id),
                methods: BTreeMap::new(),
            };
            self.apis
                .get_mut(api_id)
                .expect("api checked above")
                .resources
                .insert(id.clone(), record);
            parent_id = id;
        }
        parent_id
    }
}

fn child_path(parent_path: &str, part: &str) -> String {
    if parent_path == "/" {
        format!("/{part}")
    } else {
        format!("{parent_path}/{part}")
    }
}

/// In-memory stand-in for the remote gateway and function services.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    inner: Mutex<GatewayState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway pre-seeded with one API (and its root resource).
    pub fn with_api(api_id: &str) -> Self {
        let gateway = Self::new();
        gateway
            .inner
            .lock()
            .unwrap()
            .insert_api(api_id, "seeded-api", "seeded");
        gateway
    }

    /// Seed the full chain for `path` and return the leaf resource id.
    pub fn seed_resource(&self, api_id: &str, path: &str) -> String {
        self.inner.lock().unwrap().materialize_path(api_id, path)
    }

    /// Seed a resource chain and register a method on its leaf.
    pub fn seed_method(&self, api_id: &str, path: &str, method: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        let id = state.materialize_path(api_id, path);
        state
            .apis
            .get_mut(api_id)
            .expect("api must be seeded")
            .resources
            .get_mut(&id)
            .expect("just materialized")
            .methods
            .insert(method.to_string(), MethodRecord::default());
        id
    }

    /// Make the named operation fail exactly once with the given error.
    pub fn fail_next(&self, op: &'static str, err: ProviderError) {
        self.inner.lock().unwrap().fail_next.insert(op, err);
    }

    /// Make the next `create_resource` behave as if a concurrent writer got
    /// there first: the segment appears, but the call reports a conflict.
    pub fn conflict_once_on_create(&self) {
        self.inner.lock().unwrap().conflict_on_next_create = true;
    }

    pub fn api_count(&self) -> usize {
        self.inner.lock().unwrap().apis.len()
    }

    pub fn api_exists(&self, api_id: &str) -> bool {
        self.inner.lock().unwrap().apis.contains_key(api_id)
    }

    pub fn api_name(&self, api_id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .apis
            .get(api_id)
            .map(|a| a.name.clone())
    }

    pub fn resource_id(&self, api_id: &str, path: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .find_by_path(api_id, path)
            .map(|r| r.id.clone())
    }

    pub fn has_resource(&self, api_id: &str, path: &str) -> bool {
        self.resource_id(api_id, path).is_some()
    }

    /// Parent resource id of the segment at `path`.
    pub fn parent_of(&self, api_id: &str, path: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .find_by_path(api_id, path)
            .and_then(|r| r.parent_id.clone())
    }

    pub fn methods_at(&self, api_id: &str, path: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .find_by_path(api_id, path)
            .map(|r| r.methods.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn integration_uri(&self, api_id: &str, path: &str, method: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .find_by_path(api_id, path)
            .and_then(|r| r.methods.get(method))
            .and_then(|m| m.integration_uri.clone())
    }

    /// Every `create_resource` invocation, as `(parent_id, path_part)`, in
    /// call order. Conflicted calls are included.
    pub fn create_resource_calls(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().create_resource_calls.clone()
    }

    /// Just the `path_part` of every `create_resource` call, in order.
    pub fn created_parts(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .create_resource_calls
            .iter()
            .map(|(_, part)| part.clone())
            .collect()
    }

    pub fn put_method_calls(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().put_method_calls.clone()
    }

    /// Successful method deletions, as `(resource_path, method)`.
    pub fn deleted_methods(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().deleted_methods.clone()
    }

    /// Successfully deleted resource ids, in deletion order.
    pub fn deleted_resources(&self) -> Vec<String> {
        self.inner.lock().unwrap().deleted_resources.clone()
    }

    /// Deployments as `(api_id, stage)`, in creation order.
    pub fn deployments(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().deployments.clone()
    }

    /// Permission grants as `(function_name, source_arn, statement_id)`.
    pub fn permissions(&self) -> Vec<(String, String, String)> {
        self.inner.lock().unwrap().permissions.clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.inner.lock().unwrap().list_calls
    }
}

#[async_trait]
impl GatewayProvider for InMemoryGateway {
    async fn get_rest_api(&self, api_id: &str) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("get_rest_api") {
            return Err(err);
        }
        if state.apis.contains_key(api_id) {
            Ok(())
        } else {
            Err(ProviderError::NotFound)
        }
    }

    async fn create_rest_api(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("create_rest_api") {
            return Err(err);
        }
        state.api_counter += 1;
        let api_id = format!("api{}", state.api_counter);
        state.insert_api(&api_id, name, description);
        Ok(api_id)
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("delete_rest_api") {
            return Err(err);
        }
        if state.apis.remove(api_id).is_some() {
            Ok(())
        } else {
            Err(ProviderError::NotFound)
        }
    }

    async fn list_resources(&self, api_id: &str) -> Result<Vec<GatewayResource>, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.list_calls += 1;
        if let Some(err) = state.take_fail("list_resources") {
            return Err(err);
        }
        let api = state.apis.get(api_id).ok_or(ProviderError::NotFound)?;
        Ok(api
            .resources
            .values()
            .map(|r| GatewayResource {
                id: r.id.clone(),
                path: r.path.clone(),
                parent_id: r.parent_id.clone(),
                methods: r.methods.keys().cloned().collect::<BTreeSet<_>>(),
            })
            .collect())
    }

    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String, ProviderError> {
        let mut guard = self.inner.lock().unwrap();
        let state = &mut *guard;
        state
            .create_resource_calls
            .push((parent_id.to_string(), path_part.to_string()));

        if let Some(err) = state.take_fail("create_resource") {
            return Err(err);
        }

        let api = state.apis.get(api_id).ok_or(ProviderError::NotFound)?;
        let parent = api
            .resources
            .get(parent_id)
            .ok_or(ProviderError::NotFound)?;
        let path = child_path(&parent.path, path_part);

        if state.conflict_on_next_create {
            state.conflict_on_next_create = false;
            state.materialize_path(api_id, &path);
            return Err(ProviderError::Conflict);
        }

        if state.find_by_path(api_id, &path).is_some() {
            return Err(ProviderError::Conflict);
        }

        let id = state.next_resource_id();
        let record = ResourceRecord {
            id: id.clone(),
            path,
            parent_id: Some(parent_id.to_string()),
            methods: BTreeMap::new(),
        };
        state
            .apis
            .get_mut(api_id)
            .expect("api checked above")
            .resources
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn delete_resource(&self, api_id: &str, resource_id: &str) -> Result<(), ProviderError> {
        let mut guard = self.inner.lock().unwrap();
        let state = &mut *guard;
        if let Some(err) = state.take_fail("delete_resource") {
            return Err(err);
        }
        let api = state.apis.get_mut(api_id).ok_or(ProviderError::NotFound)?;
        let Some(resource) = api.resources.get(resource_id) else {
            return Err(ProviderError::NotFound);
        };
        if resource.parent_id.is_none() {
            return Err(ProviderError::Other(anyhow::anyhow!(
                "the root resource cannot be deleted"
            )));
        }
        let path = resource.path.clone();
        let subtree_prefix = format!("{path}/");
        api.resources
            .retain(|_, r| r.path != path && !r.path.starts_with(&subtree_prefix));
        state.deleted_resources.push(resource_id.to_string());
        Ok(())
    }

    async fn get_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("get_method") {
            return Err(err);
        }
        let api = state.apis.get(api_id).ok_or(ProviderError::NotFound)?;
        let resource = api
            .resources
            .get(resource_id)
            .ok_or(ProviderError::NotFound)?;
        if resource.methods.contains_key(method) {
            Ok(())
        } else {
            Err(ProviderError::NotFound)
        }
    }

    async fn put_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError> {
        let mut guard = self.inner.lock().unwrap();
        let state = &mut *guard;
        if let Some(err) = state.take_fail("put_method") {
            return Err(err);
        }
        let api = state.apis.get_mut(api_id).ok_or(ProviderError::NotFound)?;
        let resource = api
            .resources
            .get_mut(resource_id)
            .ok_or(ProviderError::NotFound)?;
        let path = resource.path.clone();
        if resource.methods.contains_key(method) {
            state.put_method_calls.push((path, method.to_string()));
            return Err(ProviderError::Conflict);
        }
        resource
            .methods
            .insert(method.to_string(), MethodRecord::default());
        state.put_method_calls.push((path, method.to_string()));
        Ok(())
    }

    async fn delete_method(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
    ) -> Result<(), ProviderError> {
        let mut guard = self.inner.lock().unwrap();
        let state = &mut *guard;
        if let Some(err) = state.take_fail("delete_method") {
            return Err(err);
        }
        let api = state.apis.get_mut(api_id).ok_or(ProviderError::NotFound)?;
        let resource = api
            .resources
            .get_mut(resource_id)
            .ok_or(ProviderError::NotFound)?;
        let path = resource.path.clone();
        if resource.methods.remove(method).is_none() {
            return Err(ProviderError::NotFound);
        }
        state.deleted_methods.push((path, method.to_string()));
        Ok(())
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        method: &str,
        integration_uri: &str,
    ) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("put_integration") {
            return Err(err);
        }
        let api = state.apis.get_mut(api_id).ok_or(ProviderError::NotFound)?;
        let resource = api
            .resources
            .get_mut(resource_id)
            .ok_or(ProviderError::NotFound)?;
        let record = resource
            .methods
            .get_mut(method)
            .ok_or(ProviderError::NotFound)?;
        record.integration_uri = Some(integration_uri.to_string());
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<String, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("create_deployment") {
            return Err(err);
        }
        if !state.apis.contains_key(api_id) {
            return Err(ProviderError::NotFound);
        }
        state.deployment_counter += 1;
        let deployment_id = format!("dep{}", state.deployment_counter);
        state
            .deployments
            .push((api_id.to_string(), stage.to_string()));
        Ok(deployment_id)
    }
}

#[async_trait]
impl FunctionPermissionProvider for InMemoryGateway {
    async fn add_invoke_permission(
        &self,
        function_name: &str,
        source_arn: &str,
        statement_id: &str,
    ) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.take_fail("add_invoke_permission") {
            return Err(err);
        }
        state.permissions.push((
            function_name.to_string(),
            source_arn.to_string(),
            statement_id.to_string(),
        ));
        Ok(())
    }
}
