//! Canonical schema constants for structured logging and events
//!
//! Every log line emitted by the apply engine uses these keys so a
//! controller can filter a reconciliation pass by workload or scope.
//! `tracing` needs field names as literals at the call site, so the
//! constants name the keys for readers of the log stream (and its tests).

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Resource identity
pub const FIELD_WORKLOAD: &str = "workload";
pub const FIELD_SCOPE: &str = "scope";

// Collection sizes
pub const FIELD_WORKLOAD_COUNT: &str = "workload_count";
pub const FIELD_TRAIT_COUNT: &str = "trait_count";
pub const FIELD_SCOPE_COUNT: &str = "scope_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SKIP: &str = "skip";
