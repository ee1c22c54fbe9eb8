use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{
    Applicator, ApplyOption, Reader, StoreError, TraitDefinitionRegistry, Writer,
};
use crate::context::Context;
use crate::model::{Managed, Reference, Resource, TraitTypeDescriptor};

/// Storage key of a resource: (apiVersion, kind, namespace, name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ObjectKey {
    api_version: String,
    kind: String,
    namespace: String,
    name: String,
}

impl ObjectKey {
    fn of(resource: &Resource) -> Self {
        Self {
            api_version: resource.api_version().to_string(),
            kind: resource.kind().to_string(),
            namespace: resource.namespace().unwrap_or_default().to_string(),
            name: resource.name().to_string(),
        }
    }

    /// A reference without a namespace matches the key in any namespace
    fn matches(&self, reference: &Reference) -> bool {
        self.api_version == reference.api_version
            && self.kind == reference.kind
            && self.name == reference.name
            && reference
                .namespace
                .as_deref()
                .map_or(true, |ns| ns == self.namespace)
    }
}

/// In-memory resource store implementing every engine capability
///
/// Mutex-guarded maps so it can sit behind the `Send + Sync` capability
/// traits. Objects are kept in key order for deterministic listing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<ObjectKey, Resource>>,
    definitions: HashMap<(String, String), TraitTypeDescriptor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the descriptor returned for traits of (apiVersion, kind)
    pub fn with_trait_definition(
        mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
        descriptor: TraitTypeDescriptor,
    ) -> Self {
        self.definitions
            .insert((api_version.into(), kind.into()), descriptor);
        self
    }

    /// Seed an object, replacing any existing one with the same key
    ///
    /// # Errors
    ///
    /// Returns a backend error if the store lock is poisoned.
    pub fn insert(&self, resource: Resource) -> Result<(), StoreError> {
        self.lock()?.insert(ObjectKey::of(&resource), resource);
        Ok(())
    }

    /// Look up a stored object; `None` if absent or the lock is poisoned
    pub fn object(&self, reference: &Reference) -> Option<Resource> {
        let objects = self.lock().ok()?;
        objects
            .iter()
            .find(|(key, _)| key.matches(reference))
            .map(|(_, resource)| resource.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|objects| objects.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ObjectKey, Resource>>, StoreError> {
        self.objects
            .lock()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))
    }
}

/// UID of the controller owning `resource`, if any
fn controller_uid(resource: &Resource) -> Option<&str> {
    resource
        .get_value("metadata.ownerReferences")
        .ok()?
        .as_array()?
        .iter()
        .find(|owner| owner.get("controller").and_then(Value::as_bool) == Some(true))
        .and_then(|owner| owner.get("uid"))
        .and_then(Value::as_str)
}

#[async_trait]
impl Applicator for MemoryStore {
    async fn apply(
        &self,
        _ctx: &Context,
        object: Managed<'_>,
        options: &[ApplyOption],
    ) -> Result<(), StoreError> {
        let resource = object.resource();
        let key = ObjectKey::of(resource);
        let mut objects = self.lock()?;

        if let Some(owner) = objects.get(&key).and_then(controller_uid) {
            for option in options {
                match option {
                    ApplyOption::MustBeControllableBy(uid) if owner != uid => {
                        return Err(StoreError::Conflict {
                            kind: key.kind.clone(),
                            name: key.name.clone(),
                            message: format!("controlled by {}, not {}", owner, uid),
                        });
                    }
                    ApplyOption::MustBeControllableBy(_) => {}
                }
            }
        }

        objects.insert(key, resource.clone());
        Ok(())
    }
}

#[async_trait]
impl Reader for MemoryStore {
    async fn get(&self, _ctx: &Context, key: &Reference) -> Result<Resource, StoreError> {
        self.lock()?
            .iter()
            .find(|(k, _)| k.matches(key))
            .map(|(_, resource)| resource.clone())
            .ok_or_else(|| StoreError::not_found(key))
    }
}

#[async_trait]
impl Writer for MemoryStore {
    async fn update(&self, _ctx: &Context, object: Managed<'_>) -> Result<(), StoreError> {
        let resource = object.resource();
        let key = ObjectKey::of(resource);
        let mut objects = self.lock()?;
        match objects.get_mut(&key) {
            Some(slot) => {
                *slot = resource.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(&resource.reference())),
        }
    }
}

#[async_trait]
impl TraitDefinitionRegistry for MemoryStore {
    async fn trait_definition(
        &self,
        _ctx: &Context,
        api_version: &str,
        kind: &str,
    ) -> Result<TraitTypeDescriptor, StoreError> {
        self.definitions
            .get(&(api_version.to_string(), kind.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "TraitDefinition".to_string(),
                name: format!("{}/{}", api_version, kind),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> Resource {
        Resource::new("scope.oam.dev", "scopeKind", "s").with_namespace("ns")
    }

    #[tokio::test]
    async fn test_apply_then_get() {
        let store = MemoryStore::new();
        let ctx = Context::background();
        store.apply(&ctx, Managed::Scope(&scope()), &[]).await.unwrap();

        let got = store
            .get(&ctx, &Reference::new("scope.oam.dev", "scopeKind", "s"))
            .await
            .unwrap();
        assert_eq!(got, scope());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_respects_namespace() {
        let store = MemoryStore::new();
        store.insert(scope()).unwrap();
        let err = store
            .get(
                &Context::background(),
                &Reference::new("scope.oam.dev", "scopeKind", "s").with_namespace("other"),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let store = MemoryStore::new();
        let err = store
            .update(&Context::background(), Managed::Scope(&scope()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_must_be_controllable_by() {
        let store = MemoryStore::new();
        let mut owned = scope();
        owned
            .set_value(
                "metadata.ownerReferences",
                json!([{"uid": "owner-a", "controller": true}]),
            )
            .unwrap();
        store.insert(owned).unwrap();

        let ctx = Context::background();
        let foreign = [ApplyOption::MustBeControllableBy("owner-b".to_string())];
        let err = store
            .apply(&ctx, Managed::Workload(&scope()), &foreign)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let own = [ApplyOption::MustBeControllableBy("owner-a".to_string())];
        assert!(store.apply(&ctx, Managed::Workload(&scope()), &own).await.is_ok());
    }

    #[tokio::test]
    async fn test_trait_definition_lookup() {
        let store = MemoryStore::new().with_trait_definition(
            "trait.oam.dev",
            "traitKind",
            TraitTypeDescriptor::with_workload_ref_path("spec.workloadRef"),
        );
        let ctx = Context::background();
        let found = store
            .trait_definition(&ctx, "trait.oam.dev", "traitKind")
            .await
            .unwrap();
        assert_eq!(found.injection_path(), Some("spec.workloadRef"));
        assert!(store
            .trait_definition(&ctx, "trait.oam.dev", "other")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
