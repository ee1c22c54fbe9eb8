use appconf_core_types::{RequestContext, RequestId, TraceId};
use thiserror::Error;

use crate::client::StoreError;
use crate::context::CancelReason;
use crate::fieldpath::FieldPathError;
use crate::model::Reference;

/// Result type alias using ApplyError
pub type Result<T> = std::result::Result<T, ApplyError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification the calling controller uses to pick a status
/// condition. Each kind maps to a stable `ERR_*` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Apply pipeline
    ApplyWorkload,
    GetTraitDefinition,
    ApplyTrait,
    GetScope,
    UpdateScope,
    AttributeWrite,
    Cancelled,

    // Store causes
    NotFound,
    Conflict,
    ExternalService,

    // Attribute paths and configuration
    InvalidPath,
    InvalidConfig,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ApplyWorkload => "ERR_APPLY_WORKLOAD",
            ExErrorKind::GetTraitDefinition => "ERR_GET_TRAIT_DEFINITION",
            ExErrorKind::ApplyTrait => "ERR_APPLY_TRAIT",
            ExErrorKind::GetScope => "ERR_GET_SCOPE",
            ExErrorKind::UpdateScope => "ERR_UPDATE_SCOPE",
            ExErrorKind::AttributeWrite => "ERR_ATTRIBUTE_WRITE",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// Flattened view of an [`ApplyError`] with identity fields a controller can
/// put straight into a status condition. The cause chain is kept in `source`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    api_version: Option<String>,
    resource_kind: Option<String>,
    name: Option<String>,
    scope: Option<String>,
    path: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            api_version: None,
            resource_kind: None,
            name: None,
            scope: None,
            path: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add resource identity context
    pub fn with_resource(
        mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.api_version = Some(api_version.into());
        self.resource_kind = Some(kind.into());
        self.name = Some(name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the correlation ids of the call the error surfaced from
    pub fn with_request(mut self, request: &RequestContext) -> Self {
        self.request_id = Some(request.request_id.clone());
        self.trace_id = request.trace_id.clone();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Kind of the resource the error is about (not the error kind)
    pub fn resource_kind(&self) -> Option<&str> {
        self.resource_kind.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let (Some(api_version), Some(kind)) = (&self.api_version, &self.resource_kind) {
            write!(f, " (resource: {} {})", api_version, kind)?;
        }
        if let Some(name) = &self.name {
            write!(f, " (name: {})", name)?;
        }
        if let Some(scope) = &self.scope {
            write!(f, " (scope: {})", scope)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Underlying failure of a step that both talks to the store and mutates
/// an attribute tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Cause {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    AttributeWrite(#[from] FieldPathError),
}

/// Errors returned by [`crate::apply`]
///
/// Every variant names the unit of work that failed and keeps its cause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    /// The workload upsert failed
    #[error("cannot apply workload {name:?}: {source}")]
    ApplyWorkload {
        name: String,
        #[source]
        source: StoreError,
    },

    /// The trait's type descriptor could not be resolved
    #[error("cannot find trait definition {api_version:?} {kind:?} {name:?}: {source}")]
    GetTraitDefinition {
        api_version: String,
        kind: String,
        name: String,
        #[source]
        source: StoreError,
    },

    /// Injecting the workload reference or upserting the trait failed
    #[error("cannot apply trait {api_version:?} {kind:?} {name:?}: {source}")]
    ApplyTrait {
        api_version: String,
        kind: String,
        name: String,
        #[source]
        source: Cause,
    },

    /// A scope could not be fetched for a membership change
    #[error("cannot get scope {scope} for workload {workload}: {source}")]
    GetScope {
        scope: Reference,
        workload: Reference,
        #[source]
        source: StoreError,
    },

    /// A scope member list could not be edited or written back
    #[error("cannot update scope {scope} for workload {workload}: {source}")]
    UpdateScope {
        scope: Reference,
        workload: Reference,
        #[source]
        source: Cause,
    },

    /// The caller's context was cancelled or timed out before `op`
    #[error("{op} aborted: {reason}")]
    Cancelled { op: String, reason: CancelReason },
}

impl ApplyError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ApplyError::Cancelled { .. })
    }

    /// The attribute path that could not be written, if that is the cause
    pub fn attribute_path(&self) -> Option<&str> {
        match self {
            ApplyError::ApplyTrait {
                source: Cause::AttributeWrite(err),
                ..
            }
            | ApplyError::UpdateScope {
                source: Cause::AttributeWrite(err),
                ..
            } => err.path(),
            _ => None,
        }
    }
}

impl From<StoreError> for ExError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound { kind, name } => ExError::new(ExErrorKind::NotFound)
                .with_name(name)
                .with_message(format!("{} not found", kind)),
            StoreError::Conflict { name, .. } => ExError::new(ExErrorKind::Conflict)
                .with_name(name)
                .with_message(message),
            StoreError::Backend { .. } => {
                ExError::new(ExErrorKind::ExternalService).with_message(message)
            }
        }
    }
}

impl From<FieldPathError> for ExError {
    fn from(err: FieldPathError) -> Self {
        let kind = match err {
            FieldPathError::InvalidPath { .. } => ExErrorKind::InvalidPath,
            _ => ExErrorKind::AttributeWrite,
        };
        let ex = ExError::new(kind).with_message(err.to_string());
        match err.path() {
            Some(path) => ex.with_path(path),
            None => ex,
        }
    }
}

impl From<Cause> for ExError {
    fn from(cause: Cause) -> Self {
        match cause {
            Cause::Store(err) => err.into(),
            Cause::AttributeWrite(err) => err.into(),
        }
    }
}

/// Conversion from ApplyError to ExError
///
/// Path collisions surface as `AttributeWrite` regardless of which step hit
/// them, so operators see the path instead of a generic apply failure.
impl From<ApplyError> for ExError {
    fn from(err: ApplyError) -> Self {
        let message = err.to_string();
        match err {
            ApplyError::ApplyWorkload { name, source } => {
                ExError::new(ExErrorKind::ApplyWorkload)
                    .with_op("apply_workload")
                    .with_name(name)
                    .with_message(message)
                    .with_source(source.into())
            }

            ApplyError::GetTraitDefinition {
                api_version,
                kind,
                name,
                source,
            } => ExError::new(ExErrorKind::GetTraitDefinition)
                .with_op("get_trait_definition")
                .with_resource(api_version, kind, name)
                .with_message(message)
                .with_source(source.into()),

            ApplyError::ApplyTrait {
                api_version,
                kind,
                name,
                source,
            } => {
                let ex = match &source {
                    Cause::AttributeWrite(path_err) => {
                        let ex = ExError::new(ExErrorKind::AttributeWrite);
                        match path_err.path() {
                            Some(path) => ex.with_path(path),
                            None => ex,
                        }
                    }
                    Cause::Store(_) => ExError::new(ExErrorKind::ApplyTrait),
                };
                ex.with_op("apply_trait")
                    .with_resource(api_version, kind, name)
                    .with_message(message)
                    .with_source(source.into())
            }

            ApplyError::GetScope {
                scope,
                workload,
                source,
            } => ExError::new(ExErrorKind::GetScope)
                .with_op("get_scope")
                .with_resource(workload.api_version, workload.kind, workload.name)
                .with_scope(scope.name)
                .with_message(message)
                .with_source(source.into()),

            ApplyError::UpdateScope {
                scope,
                workload,
                source,
            } => {
                let ex = match &source {
                    Cause::AttributeWrite(path_err) => {
                        let ex = ExError::new(ExErrorKind::AttributeWrite);
                        match path_err.path() {
                            Some(path) => ex.with_path(path),
                            None => ex,
                        }
                    }
                    Cause::Store(_) => ExError::new(ExErrorKind::UpdateScope),
                };
                ex.with_op("update_scope")
                    .with_resource(workload.api_version, workload.kind, workload.name)
                    .with_scope(scope.name)
                    .with_message(message)
                    .with_source(source.into())
            }

            ApplyError::Cancelled { op, .. } => ExError::new(ExErrorKind::Cancelled)
                .with_op(op)
                .with_message(message),
        }
    }
}
