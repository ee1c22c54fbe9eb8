use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Reference;
use crate::fieldpath::{self, value_type_name, FieldPathError};

/// A resource body held as a schema-less attribute tree
///
/// The body is always a JSON object; identity lives at the usual
/// `apiVersion`, `kind` and `metadata.{name,namespace,uid}` locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Resource {
    object: Value,
}

impl Resource {
    /// Create an empty body with the given identity
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut object = Map::new();
        object.insert("apiVersion".to_string(), Value::String(api_version.into()));
        object.insert("kind".to_string(), Value::String(kind.into()));
        let mut resource = Self {
            object: Value::Object(object),
        };
        resource.set_metadata("name", name.into());
        resource
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.set_metadata("namespace", namespace.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.set_metadata("uid", uid.into());
        self
    }

    pub fn api_version(&self) -> &str {
        self.str_field(&["apiVersion"]).unwrap_or_default()
    }

    pub fn kind(&self) -> &str {
        self.str_field(&["kind"]).unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.str_field(&["metadata", "name"]).unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.str_field(&["metadata", "namespace"])
    }

    pub fn uid(&self) -> Option<&str> {
        self.str_field(&["metadata", "uid"])
    }

    /// Full identity of this resource, including namespace and uid
    pub fn reference(&self) -> Reference {
        Reference {
            api_version: self.api_version().to_string(),
            kind: self.kind().to_string(),
            name: self.name().to_string(),
            namespace: self.namespace().map(str::to_string),
            uid: self.uid().map(str::to_string),
        }
    }

    /// Read the value at a field path
    ///
    /// # Errors
    ///
    /// See [`fieldpath::get_value`].
    pub fn get_value(&self, path: &str) -> Result<&Value, FieldPathError> {
        fieldpath::get_value(&self.object, path)
    }

    /// Write a value at a field path
    ///
    /// # Errors
    ///
    /// See [`fieldpath::set_value`].
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<(), FieldPathError> {
        fieldpath::set_value(&mut self.object, path, value)
    }

    pub fn as_value(&self) -> &Value {
        &self.object
    }

    pub fn into_value(self) -> Value {
        self.object
    }

    fn str_field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .try_fold(&self.object, |node, key| node.get(*key))
            .and_then(Value::as_str)
    }

    fn set_metadata(&mut self, key: &str, value: String) {
        if let Value::Object(object) = &mut self.object {
            let metadata = object
                .entry("metadata")
                .or_insert_with(|| Value::Object(Map::new()));
            if !metadata.is_object() {
                *metadata = Value::Object(Map::new());
            }
            if let Value::Object(metadata) = metadata {
                metadata.insert(key.to_string(), Value::String(value));
            }
        }
    }
}

impl TryFrom<Value> for Resource {
    type Error = FieldPathError;

    fn try_from(object: Value) -> Result<Self, Self::Error> {
        if !object.is_object() {
            return Err(FieldPathError::InvalidBody {
                found: value_type_name(&object),
            });
        }
        Ok(Self { object })
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.object
    }
}
