//! Shared fixtures and a scriptable store double for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use appconf_core::client::{
    Applicator, ApplyOption, Reader, StoreError, TraitDefinitionRegistry, Writer,
};
use appconf_core::{Context, Managed, Reference, Resource, TraitTypeDescriptor, Workload};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const NAMESPACE: &str = "ns";
pub const WORKLOAD_API_VERSION: &str = "workload.oam.dev";
pub const WORKLOAD_KIND: &str = "workloadKind";
pub const WORKLOAD_NAME: &str = "workload-example";
pub const WORKLOAD_UID: &str = "workload-uid";
pub const TRAIT_API_VERSION: &str = "trait.oam.dev";
pub const TRAIT_KIND: &str = "traitKind";
pub const TRAIT_NAME: &str = "trait-example";
pub const SCOPE_API_VERSION: &str = "scope.oam.dev";
pub const SCOPE_KIND: &str = "scopeKind";
pub const SCOPE_NAME: &str = "scope-example";
pub const SCOPE_UID: &str = "scope-uid";

pub fn workload_body() -> Resource {
    Resource::new(WORKLOAD_API_VERSION, WORKLOAD_KIND, WORKLOAD_NAME)
        .with_namespace(NAMESPACE)
        .with_uid(WORKLOAD_UID)
}

pub fn workload_ref() -> Reference {
    workload_body().reference()
}

pub fn trait_body() -> Resource {
    Resource::new(TRAIT_API_VERSION, TRAIT_KIND, TRAIT_NAME).with_namespace(NAMESPACE)
}

pub fn scope_body() -> Resource {
    Resource::new(SCOPE_API_VERSION, SCOPE_KIND, SCOPE_NAME)
        .with_namespace(NAMESPACE)
        .with_uid(SCOPE_UID)
}

pub fn scope_ref() -> Reference {
    Reference::new(SCOPE_API_VERSION, SCOPE_KIND, SCOPE_NAME).with_namespace(NAMESPACE)
}

/// Scope body whose member list holds exactly `members`
pub fn scope_with_members(members: Vec<Value>) -> Resource {
    let mut scope = scope_body();
    scope
        .set_value("spec.workloadRefs", Value::Array(members))
        .unwrap();
    scope
}

/// The member-list entry the engine writes for the fixture workload
pub fn workload_entry() -> Value {
    json!({
        "apiVersion": WORKLOAD_API_VERSION,
        "kind": WORKLOAD_KIND,
        "name": WORKLOAD_NAME,
    })
}

pub fn workload_with_trait() -> Workload {
    Workload::new(workload_body()).with_trait(trait_body())
}

type ApplyFn = Box<dyn Fn(Managed<'_>, &[ApplyOption]) -> Result<(), StoreError> + Send + Sync>;
type GetFn = Box<dyn Fn(&Reference) -> Result<Resource, StoreError> + Send + Sync>;
type UpdateFn = Box<dyn Fn(Managed<'_>) -> Result<(), StoreError> + Send + Sync>;
type DefinitionFn =
    Box<dyn Fn(&str, &str) -> Result<TraitTypeDescriptor, StoreError> + Send + Sync>;

/// Store double whose every capability is a replaceable closure
///
/// Calls are recorded so tests can assert on exactly what reached the
/// store, in which order.
pub struct FakeClient {
    apply_fn: ApplyFn,
    get_fn: GetFn,
    update_fn: UpdateFn,
    definition_fn: DefinitionFn,
    applied: Mutex<Vec<(String, Resource, Vec<ApplyOption>)>>,
    updated: Mutex<Vec<Resource>>,
    gets: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    /// Everything succeeds; gets return the fixture scope with no members;
    /// trait definitions carry no reference path
    pub fn new() -> Self {
        Self {
            apply_fn: Box::new(|_, _| Ok(())),
            get_fn: Box::new(|_| Ok(scope_body())),
            update_fn: Box::new(|_| Ok(())),
            definition_fn: Box::new(|_, _| Ok(TraitTypeDescriptor::default())),
            applied: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            gets: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_apply(
        mut self,
        f: impl Fn(Managed<'_>, &[ApplyOption]) -> Result<(), StoreError> + Send + Sync + 'static,
    ) -> Self {
        self.apply_fn = Box::new(f);
        self
    }

    pub fn on_get(
        mut self,
        f: impl Fn(&Reference) -> Result<Resource, StoreError> + Send + Sync + 'static,
    ) -> Self {
        self.get_fn = Box::new(f);
        self
    }

    pub fn on_update(
        mut self,
        f: impl Fn(Managed<'_>) -> Result<(), StoreError> + Send + Sync + 'static,
    ) -> Self {
        self.update_fn = Box::new(f);
        self
    }

    pub fn on_trait_definition(
        mut self,
        f: impl Fn(&str, &str) -> Result<TraitTypeDescriptor, StoreError> + Send + Sync + 'static,
    ) -> Self {
        self.definition_fn = Box::new(f);
        self
    }

    /// (role, body, options) of every apply call, in call order
    pub fn applied(&self) -> Vec<(String, Resource, Vec<ApplyOption>)> {
        self.applied.lock().unwrap().clone()
    }

    pub fn applied_names(&self) -> Vec<String> {
        self.applied()
            .into_iter()
            .map(|(_, body, _)| body.name().to_string())
            .collect()
    }

    pub fn updated(&self) -> Vec<Resource> {
        self.updated.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updated.lock().unwrap().len()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Every capability call as `"<call> <name>"`, in call order across
    /// capabilities, e.g. `"apply:trait trait-example"` or `"get scope-example"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Applicator for FakeClient {
    async fn apply(
        &self,
        _ctx: &Context,
        object: Managed<'_>,
        options: &[ApplyOption],
    ) -> Result<(), StoreError> {
        self.record(format!("apply:{} {}", object.role(), object.resource().name()));
        self.applied.lock().unwrap().push((
            object.role().to_string(),
            object.resource().clone(),
            options.to_vec(),
        ));
        (self.apply_fn)(object, options)
    }
}

#[async_trait]
impl Reader for FakeClient {
    async fn get(&self, _ctx: &Context, key: &Reference) -> Result<Resource, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.record(format!("get {}", key.name));
        (self.get_fn)(key)
    }
}

#[async_trait]
impl Writer for FakeClient {
    async fn update(&self, _ctx: &Context, object: Managed<'_>) -> Result<(), StoreError> {
        self.record(format!("update {}", object.resource().name()));
        self.updated.lock().unwrap().push(object.resource().clone());
        (self.update_fn)(object)
    }
}

#[async_trait]
impl TraitDefinitionRegistry for FakeClient {
    async fn trait_definition(
        &self,
        _ctx: &Context,
        api_version: &str,
        kind: &str,
    ) -> Result<TraitTypeDescriptor, StoreError> {
        self.record(format!("trait_definition {}/{}", api_version, kind));
        (self.definition_fn)(api_version, kind)
    }
}
