use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Identity of a resource without its body
///
/// Derived equality compares every field. Reconciliation uses
/// [`Reference::matches`] instead, which ignores `uid`: a workload may be
/// deleted and recreated between passes and must still be recognised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Reference {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: None,
            uid: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Reconciliation identity: apiVersion, kind and name must agree, and
    /// namespace too when both sides carry one
    pub fn matches(&self, other: &Reference) -> bool {
        self.api_version == other.api_version
            && self.kind == other.kind
            && self.name == other.name
            && match (&self.namespace, &other.namespace) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }

    /// Whether a member-list entry (`{apiVersion, kind, name}`) refers to this resource
    ///
    /// Entries that are not objects never match.
    pub fn matches_entry(&self, entry: &Value) -> bool {
        let field = |key: &str| entry.get(key).and_then(Value::as_str);
        entry.is_object()
            && field("apiVersion") == Some(self.api_version.as_str())
            && field("kind") == Some(self.kind.as_str())
            && field("name") == Some(self.name.as_str())
    }

    /// The `{apiVersion, kind, name}` map written into traits and scopes
    pub fn to_typed_value(&self) -> Value {
        json!({
            "apiVersion": self.api_version,
            "kind": self.kind,
            "name": self.name,
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.api_version, self.kind)?;
        match &self.namespace {
            Some(namespace) => write!(f, " {}/{}", namespace, self.name),
            None => write!(f, " {}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_uid() {
        let a = Reference::new("workload.oam.dev", "workloadKind", "w").with_uid("uid-1");
        let b = Reference::new("workload.oam.dev", "workloadKind", "w").with_uid("uid-2");
        assert!(a.matches(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_namespace_only_when_both_present() {
        let plain = Reference::new("v1", "Scope", "s");
        let ns_a = plain.clone().with_namespace("a");
        let ns_b = plain.clone().with_namespace("b");
        assert!(plain.matches(&ns_a));
        assert!(!ns_a.matches(&ns_b));
    }

    #[test]
    fn test_matches_entry() {
        let r = Reference::new("v1", "Kind", "n");
        assert!(r.matches_entry(&r.to_typed_value()));
        assert!(r.matches_entry(
            &json!({"apiVersion": "v1", "kind": "Kind", "name": "n", "uid": "x"})
        ));
        assert!(!r.matches_entry(&json!({"apiVersion": "v1", "kind": "Kind", "name": "other"})));
        assert!(!r.matches_entry(&json!("v1/Kind/n")));
    }

    #[test]
    fn test_serde_camel_case() {
        let r = Reference::new("v1", "Kind", "n");
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value, json!({"apiVersion": "v1", "kind": "Kind", "name": "n"}));
    }
}
