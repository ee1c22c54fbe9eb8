//! Apply entry point
//!
//! `apply()` converges one ApplicationConfiguration's desired workloads onto
//! the store. It is called once per reconciliation pass by the controller.
//!
//! ## Contract
//!
//! - **Ordered**: workloads are processed one at a time in input order; a
//!   workload is upserted before its traits, and its traits before its
//!   scope memberships are reconciled
//! - **Fail-fast**: the first failure ends the call; later workloads are
//!   not attempted and nothing is retried
//! - **Identified**: every error names the resource and step that failed
//! - **Stateless**: nothing is cached between calls
//!
//! ## Example
//!
//! ```
//! use appconf_core::{apply, Context, MemoryStore, Resource, TraitTypeDescriptor, Workload};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new().with_trait_definition(
//!     "core.oam.dev/v1alpha2",
//!     "ManualScalerTrait",
//!     TraitTypeDescriptor::with_workload_ref_path("spec.workloadRef"),
//! );
//! let body = Resource::new("core.oam.dev/v1alpha2", "ContainerizedWorkload", "web");
//! let scaler = Resource::new("core.oam.dev/v1alpha2", "ManualScalerTrait", "web-scaler");
//! let workload = Workload::new(body).with_trait(scaler);
//!
//! apply(&Context::background(), &store, &[], &[workload]).await.unwrap();
//! assert_eq!(store.len(), 2);
//! # });
//! ```

use std::time::Instant;

use appconf_core_types::TraceId;

use crate::client::{Applicator, ApplyOption, Client, Reader, TraitDefinitionRegistry, Writer};
use crate::config::ApplyConfig;
use crate::context::Context;
use crate::errors::{ApplyError, Cause, ExError, Result};
use crate::model::{find_status, Managed, Reference, Resource, Workload, WorkloadStatus};
use crate::ops::inject::inject_workload_ref;
use crate::ops::scope::ScopeReconciler;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply `workloads` with the default configuration and no apply options
///
/// # Errors
///
/// Returns the first failure as an [`ApplyError`]; see [`Applier::apply`].
pub async fn apply<C: Client>(
    ctx: &Context,
    client: &C,
    previous: &[WorkloadStatus],
    workloads: &[Workload],
) -> Result<()> {
    Applier::new(client).apply(ctx, previous, workloads, &[]).await
}

/// The apply engine bound to its store capabilities
///
/// Workload and trait upserts go through the applicator; scope reads and
/// writes go through the reader and writer, which may be a different client.
pub struct Applier<'a> {
    applicator: &'a dyn Applicator,
    reader: &'a dyn Reader,
    writer: &'a dyn Writer,
    registry: &'a dyn TraitDefinitionRegistry,
    config: ApplyConfig,
}

impl<'a> Applier<'a> {
    /// Use one client for every capability
    pub fn new<C: Client>(client: &'a C) -> Self {
        Self::from_parts(client, client, client, client)
    }

    pub fn from_parts(
        applicator: &'a dyn Applicator,
        reader: &'a dyn Reader,
        writer: &'a dyn Writer,
        registry: &'a dyn TraitDefinitionRegistry,
    ) -> Self {
        Self {
            applicator,
            reader,
            writer,
            registry,
            config: ApplyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ApplyConfig) -> Self {
        self.config = config;
        self
    }

    /// Converge `workloads`, using `previous` as the before-state of scope
    /// memberships
    ///
    /// `options` are forwarded to every workload and trait upsert.
    ///
    /// # Errors
    ///
    /// - `ApplyWorkload` if a workload upsert fails
    /// - `GetTraitDefinition` if a trait's type cannot be resolved
    /// - `ApplyTrait` if reference injection or the trait upsert fails
    /// - `GetScope` / `UpdateScope` if a scope membership change fails
    /// - `Cancelled` if `ctx` is cancelled or past its deadline before a store call
    pub async fn apply(
        &self,
        ctx: &Context,
        previous: &[WorkloadStatus],
        workloads: &[Workload],
        options: &[ApplyOption],
    ) -> Result<()> {
        let start = Instant::now();
        let request = ctx.request();
        let trace_id = request.trace_id.as_ref().map(TraceId::as_str);
        log_op_start!(
            "apply",
            request_id = %request.request_id,
            trace_id = trace_id,
            workload_count = workloads.len() as u64
        );

        let result = self.apply_all(ctx, previous, workloads, options).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => {
                log_op_end!(
                    "apply",
                    duration_ms = duration_ms,
                    request_id = %request.request_id,
                    trace_id = trace_id
                );
            }
            Err(err) => {
                log_op_error!(
                    "apply",
                    ExError::from(err.clone()).with_request(request),
                    duration_ms = duration_ms,
                    request_id = %request.request_id,
                    trace_id = trace_id
                );
            }
        }
        result
    }

    async fn apply_all(
        &self,
        ctx: &Context,
        previous: &[WorkloadStatus],
        workloads: &[Workload],
        options: &[ApplyOption],
    ) -> Result<()> {
        for workload in workloads {
            self.apply_workload(ctx, previous, workload, options).await?;
        }
        if self.config.dereference_orphaned_workloads {
            self.dereference_orphans(ctx, previous, workloads).await?;
        }
        Ok(())
    }

    async fn apply_workload(
        &self,
        ctx: &Context,
        previous: &[WorkloadStatus],
        workload: &Workload,
        options: &[ApplyOption],
    ) -> Result<()> {
        let start = Instant::now();
        let workload_ref = workload.reference();
        log_op_start!(
            "apply_workload",
            workload = workload_ref.name.as_str(),
            trait_count = workload.traits.len() as u64,
            scope_count = workload.scopes.len() as u64
        );

        ctx.check("apply_workload")?;
        self.applicator
            .apply(ctx, Managed::Workload(&workload.workload), options)
            .await
            .map_err(|source| ApplyError::ApplyWorkload {
                name: workload.workload.name().to_string(),
                source,
            })?;

        for body in &workload.traits {
            self.apply_trait(ctx, &workload_ref, body, options).await?;
        }

        let previous_scopes: Vec<Reference> = find_status(previous, &workload_ref)
            .map(|status| status.scope_references().cloned().collect())
            .unwrap_or_default();
        let changes = self
            .scopes()
            .reconcile(ctx, &workload_ref, &workload.scopes, &previous_scopes)
            .await?;

        log_op_end!(
            "apply_workload",
            duration_ms = start.elapsed().as_millis() as u64,
            workload = workload_ref.name.as_str(),
            scopes_added = changes.added.len() as u64,
            scopes_removed = changes.removed.len() as u64
        );
        Ok(())
    }

    async fn apply_trait(
        &self,
        ctx: &Context,
        workload: &Reference,
        body: &Resource,
        options: &[ApplyOption],
    ) -> Result<()> {
        ctx.check("get_trait_definition")?;
        let descriptor = self
            .registry
            .trait_definition(ctx, body.api_version(), body.kind())
            .await
            .map_err(|source| ApplyError::GetTraitDefinition {
                api_version: body.api_version().to_string(),
                kind: body.kind().to_string(),
                name: body.name().to_string(),
                source,
            })?;

        let trait_error = |source: Cause| ApplyError::ApplyTrait {
            api_version: body.api_version().to_string(),
            kind: body.kind().to_string(),
            name: body.name().to_string(),
            source,
        };

        let mut desired = body.clone();
        inject_workload_ref(&mut desired, descriptor.injection_path(), workload)
            .map_err(|err| trait_error(Cause::AttributeWrite(err)))?;

        ctx.check("apply_trait")?;
        self.applicator
            .apply(ctx, Managed::Trait(&desired), options)
            .await
            .map_err(|err| trait_error(Cause::Store(err)))?;

        tracing::debug!(
            op = "apply_trait",
            workload = workload.name.as_str(),
            trait_name = body.name(),
            injected = descriptor.injection_path().is_some(),
            "trait applied"
        );
        Ok(())
    }

    /// Drop scope memberships of workloads that were recorded before but are
    /// no longer desired at all
    async fn dereference_orphans(
        &self,
        ctx: &Context,
        previous: &[WorkloadStatus],
        workloads: &[Workload],
    ) -> Result<()> {
        // Workloads of one configuration share its namespace
        let namespace = workloads
            .iter()
            .find_map(|w| w.workload.namespace().map(str::to_string));

        for status in previous {
            if status.scopes.is_empty()
                || workloads
                    .iter()
                    .any(|w| status.reference.matches(&w.reference()))
            {
                continue;
            }
            let mut orphan = status.reference.clone();
            if orphan.namespace.is_none() {
                orphan.namespace = namespace.clone();
            }
            let recorded: Vec<Reference> = status.scope_references().cloned().collect();
            let changes = self.scopes().reconcile(ctx, &orphan, &[], &recorded).await?;
            tracing::info!(
                op = "dereference_orphan",
                workload = orphan.name.as_str(),
                scopes_removed = changes.removed.len() as u64,
                "removed scope references of workload no longer desired"
            );
        }
        Ok(())
    }

    fn scopes(&self) -> ScopeReconciler<'_> {
        ScopeReconciler::new(self.reader, self.writer, &self.config)
    }
}
