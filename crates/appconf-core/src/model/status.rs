use serde::{Deserialize, Serialize};

use super::Reference;

/// Reconciliation state recorded for a workload by a previous pass
///
/// Only ever read by the engine; it is the "before" side of the scope diff.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    #[serde(rename = "workloadRef")]
    pub reference: Reference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<WorkloadScope>,
}

/// A scope the workload was a member of
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadScope {
    #[serde(rename = "scopeRef")]
    pub reference: Reference,
}

impl WorkloadStatus {
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: Reference) -> Self {
        self.scopes.push(WorkloadScope { reference: scope });
        self
    }

    pub fn scope_references(&self) -> impl Iterator<Item = &Reference> {
        self.scopes.iter().map(|s| &s.reference)
    }
}

/// Find the previous status entry for a workload by reconciliation identity
pub fn find_status<'a>(
    statuses: &'a [WorkloadStatus],
    workload: &Reference,
) -> Option<&'a WorkloadStatus> {
    statuses.iter().find(|s| s.reference.matches(workload))
}
