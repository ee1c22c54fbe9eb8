use serde::{Deserialize, Serialize};

/// Per-trait-type metadata resolved from the type registry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitTypeDescriptor {
    /// Where the owning workload's reference goes in the trait body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_ref_path: Option<String>,
}

impl TraitTypeDescriptor {
    pub fn with_workload_ref_path(path: impl Into<String>) -> Self {
        Self {
            workload_ref_path: Some(path.into()),
        }
    }

    /// The injection path, treating an empty string as absent
    pub fn injection_path(&self) -> Option<&str> {
        self.workload_ref_path
            .as_deref()
            .filter(|path| !path.is_empty())
    }
}
