//! Scope membership reconciliation
//!
//! A workload's previous status says which scopes it was a member of; its
//! desired scopes say which it should be a member of now. Every desired
//! scope is fetched and checked against its actual member list, so a stale
//! or missing previous status can never cause a missed add. Only scopes that
//! were recorded before and are no longer desired are candidates for removal.
//! Writes happen only when a member list actually changes.

use serde_json::Value;

use crate::client::{Reader, Writer};
use crate::config::ApplyConfig;
use crate::context::Context;
use crate::errors::{ApplyError, Cause, Result};
use crate::fieldpath::{value_type_name, FieldPathError};
use crate::model::{Managed, Reference, Resource};

/// Scopes to visit for one workload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopePlan {
    pub to_add: Vec<Reference>,
    pub to_remove: Vec<Reference>,
}

impl ScopePlan {
    /// Build the plan for `workload`
    ///
    /// Scope keys without a namespace inherit the workload's.
    pub fn new(workload: &Reference, desired: &[Resource], previous: &[Reference]) -> Self {
        let mut to_add: Vec<Reference> = Vec::new();
        for scope in desired {
            let key = scope_key(scope.reference(), workload);
            if !to_add.iter().any(|r| r.matches(&key)) {
                to_add.push(key);
            }
        }

        let mut to_remove: Vec<Reference> = Vec::new();
        for scope in previous {
            let key = scope_key(scope.clone(), workload);
            let still_desired = to_add.iter().any(|r| r.matches(&key));
            if !still_desired && !to_remove.iter().any(|r| r.matches(&key)) {
                to_remove.push(key);
            }
        }

        Self { to_add, to_remove }
    }
}

fn scope_key(mut scope: Reference, workload: &Reference) -> Reference {
    scope.uid = None;
    if scope.namespace.is_none() {
        scope.namespace = workload.namespace.clone();
    }
    scope
}

/// What a reconciliation actually wrote
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeChanges {
    pub added: Vec<Reference>,
    pub removed: Vec<Reference>,
}

pub struct ScopeReconciler<'a> {
    reader: &'a dyn Reader,
    writer: &'a dyn Writer,
    config: &'a ApplyConfig,
}

impl<'a> ScopeReconciler<'a> {
    pub fn new(reader: &'a dyn Reader, writer: &'a dyn Writer, config: &'a ApplyConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Bring scope member lists in line with the workload's desired scopes
    ///
    /// Adds are processed before removals, each in plan order.
    ///
    /// # Errors
    ///
    /// Returns `GetScope` / `UpdateScope` on the first failing scope, or
    /// `Cancelled` if the context is done before a store call.
    pub async fn reconcile(
        &self,
        ctx: &Context,
        workload: &Reference,
        desired: &[Resource],
        previous: &[Reference],
    ) -> Result<ScopeChanges> {
        let plan = ScopePlan::new(workload, desired, previous);
        let mut changes = ScopeChanges::default();

        for scope in &plan.to_add {
            if self.add_member(ctx, scope, workload).await? {
                changes.added.push(scope.clone());
            }
        }
        for scope in &plan.to_remove {
            if self.remove_member(ctx, scope, workload).await? {
                changes.removed.push(scope.clone());
            }
        }
        Ok(changes)
    }

    async fn add_member(
        &self,
        ctx: &Context,
        key: &Reference,
        workload: &Reference,
    ) -> Result<bool> {
        let mut scope = self.fetch(ctx, key, workload).await?;
        let mut members = self.members(&scope, key, workload)?;

        if members.iter().any(|entry| workload.matches_entry(entry)) {
            tracing::debug!(
                op = "add_scope_member",
                event = appconf_core_types::schema::EVENT_SKIP,
                scope = %key,
                workload = %workload,
                "workload already referenced by scope"
            );
            return Ok(false);
        }

        members.push(workload.to_typed_value());
        self.write(ctx, &mut scope, members, key, workload).await?;
        Ok(true)
    }

    async fn remove_member(
        &self,
        ctx: &Context,
        key: &Reference,
        workload: &Reference,
    ) -> Result<bool> {
        ctx.check("get_scope")?;
        let mut scope = match self.reader.get(ctx, key).await {
            Ok(scope) => scope,
            Err(err) if err.is_not_found() && self.config.ignore_missing_scope_on_removal => {
                tracing::debug!(
                    op = "remove_scope_member",
                    event = appconf_core_types::schema::EVENT_SKIP,
                    scope = %key,
                    workload = %workload,
                    "scope no longer exists"
                );
                return Ok(false);
            }
            Err(source) => {
                return Err(ApplyError::GetScope {
                    scope: key.clone(),
                    workload: workload.clone(),
                    source,
                })
            }
        };

        let members = self.members(&scope, key, workload)?;
        let before = members.len();
        let kept: Vec<Value> = members
            .into_iter()
            .filter(|entry| !workload.matches_entry(entry))
            .collect();
        if kept.len() == before {
            tracing::debug!(
                op = "remove_scope_member",
                event = appconf_core_types::schema::EVENT_SKIP,
                scope = %key,
                workload = %workload,
                "workload not referenced by scope"
            );
            return Ok(false);
        }

        self.write(ctx, &mut scope, kept, key, workload).await?;
        Ok(true)
    }

    async fn fetch(
        &self,
        ctx: &Context,
        key: &Reference,
        workload: &Reference,
    ) -> Result<Resource> {
        ctx.check("get_scope")?;
        self.reader
            .get(ctx, key)
            .await
            .map_err(|source| ApplyError::GetScope {
                scope: key.clone(),
                workload: workload.clone(),
                source,
            })
    }

    /// Current member list; a missing or null field is an empty list
    fn members(
        &self,
        scope: &Resource,
        key: &Reference,
        workload: &Reference,
    ) -> Result<Vec<Value>> {
        let path = self.config.workload_refs_path.as_str();
        let result = match scope.get_value(path) {
            Ok(Value::Array(items)) => Ok(items.clone()),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Err(FieldPathError::UnexpectedType {
                path: path.to_string(),
                expected: "an array",
                found: value_type_name(other),
            }),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        };
        result.map_err(|err| update_error(key, workload, Cause::AttributeWrite(err)))
    }

    async fn write(
        &self,
        ctx: &Context,
        scope: &mut Resource,
        members: Vec<Value>,
        key: &Reference,
        workload: &Reference,
    ) -> Result<()> {
        scope
            .set_value(&self.config.workload_refs_path, Value::Array(members))
            .map_err(|err| update_error(key, workload, Cause::AttributeWrite(err)))?;
        ctx.check("update_scope")?;
        self.writer
            .update(ctx, Managed::Scope(scope))
            .await
            .map_err(|err| update_error(key, workload, Cause::Store(err)))
    }
}

fn update_error(scope: &Reference, workload: &Reference, source: Cause) -> ApplyError {
    ApplyError::UpdateScope {
        scope: scope.clone(),
        workload: workload.clone(),
        source,
    }
}
