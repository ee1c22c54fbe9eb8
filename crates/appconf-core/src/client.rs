//! Store capabilities consumed by the apply engine
//!
//! The engine never talks to a backend directly. Callers inject these
//! narrow traits; `ops::store::MemoryStore` implements all of them.

use async_trait::async_trait;
use thiserror::Error;

use crate::context::Context;
use crate::model::{Managed, Reference, Resource, TraitTypeDescriptor};

/// Failure reported by a store capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{kind} {name:?} not found")]
    NotFound { kind: String, name: String },

    #[error("conflict writing {kind} {name:?}: {message}")]
    Conflict {
        kind: String,
        name: String,
        message: String,
    },

    #[error("{message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }

    pub fn not_found(reference: &Reference) -> Self {
        StoreError::NotFound {
            kind: reference.kind.clone(),
            name: reference.name.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Options forwarded untouched to every workload and trait upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOption {
    /// Refuse to take over an existing object controlled by someone else
    MustBeControllableBy(String),
}

/// Create-or-update of a single resource
#[async_trait]
pub trait Applicator: Send + Sync {
    async fn apply(
        &self,
        ctx: &Context,
        object: Managed<'_>,
        options: &[ApplyOption],
    ) -> Result<(), StoreError>;
}

/// Fetch of a scope resource by identity
#[async_trait]
pub trait Reader: Send + Sync {
    async fn get(&self, ctx: &Context, key: &Reference) -> Result<Resource, StoreError>;
}

/// Write-back of a scope resource after a membership change
#[async_trait]
pub trait Writer: Send + Sync {
    async fn update(&self, ctx: &Context, object: Managed<'_>) -> Result<(), StoreError>;
}

/// Lookup of trait type metadata by (apiVersion, kind)
#[async_trait]
pub trait TraitDefinitionRegistry: Send + Sync {
    async fn trait_definition(
        &self,
        ctx: &Context,
        api_version: &str,
        kind: &str,
    ) -> Result<TraitTypeDescriptor, StoreError>;
}

/// Everything the engine needs from the store in one bound
pub trait Client: Applicator + Reader + Writer + TraitDefinitionRegistry {}

impl<T> Client for T where T: Applicator + Reader + Writer + TraitDefinitionRegistry {}
