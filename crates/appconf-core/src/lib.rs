//! appconf core - ApplicationConfiguration apply engine
//!
//! Converges a desired set of workloads, their traits and their scope
//! memberships onto a resource store:
//! - Attribute paths over schema-less resource bodies (`fieldpath`)
//! - Workload back-reference injection into traits (`ops::inject`)
//! - Idempotent scope membership reconciliation (`ops::scope`)
//! - Ordered, fail-fast orchestration (`apply`)
//!
//! The store is reached only through the capability traits in `client`;
//! `MemoryStore` implements them in memory.

pub mod apply;
pub mod client;
pub mod config;
pub mod context;
pub mod errors;
pub mod fieldpath;
pub mod logging_facility;
pub mod model;
pub mod ops;

// Re-export commonly used types
pub use apply::{apply, Applier};
pub use client::{
    Applicator, ApplyOption, Client, Reader, StoreError, TraitDefinitionRegistry, Writer,
};
pub use config::ApplyConfig;
pub use context::{CancelHandle, CancelReason, Context};
pub use errors::{ApplyError, Cause, ExError, ExErrorKind, Result};
pub use model::{
    Managed, Reference, Resource, TraitTypeDescriptor, Workload, WorkloadScope, WorkloadStatus,
};
pub use ops::MemoryStore;
