pub mod inject;
pub mod scope;
pub mod store;

pub use inject::inject_workload_ref;
pub use scope::{ScopeChanges, ScopePlan, ScopeReconciler};
pub use store::MemoryStore;
