//! Engine configuration
//!
//! All settings have defaults matching the standard ApplicationConfiguration
//! scope layout, so most callers use `ApplyConfig::default()`. A TOML
//! fragment can override them:
//!
//! ```
//! use appconf_core::config::ApplyConfig;
//!
//! let config = ApplyConfig::from_toml_str(r#"workload_refs_path = "spec.members""#).unwrap();
//! assert_eq!(config.workload_refs_path, "spec.members");
//! assert!(config.dereference_orphaned_workloads);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{ExError, ExErrorKind};
use crate::fieldpath::{self, FieldPathError};

pub const DEFAULT_WORKLOAD_REFS_PATH: &str = "spec.workloadRefs";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("cannot parse apply config: {message}")]
    Parse { message: String },

    #[error("invalid workload_refs_path: {source}")]
    InvalidWorkloadRefsPath {
        #[source]
        source: FieldPathError,
    },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let ex = ExError::new(ExErrorKind::InvalidConfig)
            .with_op("load_config")
            .with_message(err.to_string());
        match err {
            ConfigError::InvalidWorkloadRefsPath { source } => ex.with_source(source.into()),
            ConfigError::Parse { .. } => ex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Where a scope keeps its member workload references
    pub workload_refs_path: String,

    /// Remove scope memberships of workloads recorded in the previous
    /// status but no longer desired at all
    pub dereference_orphaned_workloads: bool,

    /// Treat a scope that no longer exists as already dereferenced
    pub ignore_missing_scope_on_removal: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            workload_refs_path: DEFAULT_WORKLOAD_REFS_PATH.to_string(),
            dereference_orphaned_workloads: true,
            ignore_missing_scope_on_removal: true,
        }
    }
}

impl ApplyConfig {
    /// Parse and validate a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed TOML and `InvalidWorkloadRefsPath` when
    /// the member path is not a valid field path.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ApplyConfig = toml::from_str(input).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `InvalidWorkloadRefsPath` when the member path does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fieldpath::parse(&self.workload_refs_path)
            .map(|_| ())
            .map_err(|source| ConfigError::InvalidWorkloadRefsPath { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApplyConfig::default();
        assert_eq!(config.workload_refs_path, "spec.workloadRefs");
        assert!(config.dereference_orphaned_workloads);
        assert!(config.ignore_missing_scope_on_removal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ApplyConfig::from_toml_str("").unwrap(), ApplyConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ApplyConfig::from_toml_str(
            "dereference_orphaned_workloads = false\nignore_missing_scope_on_removal = false\n",
        )
        .unwrap();
        assert!(!config.dereference_orphaned_workloads);
        assert!(!config.ignore_missing_scope_on_removal);
    }

    #[test]
    fn test_rejects_bad_path() {
        let err = ApplyConfig::from_toml_str(r#"workload_refs_path = "spec..refs""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkloadRefsPath { .. }));
        let ex: ExError = err.into();
        assert_eq!(ex.code(), "ERR_INVALID_CONFIG");
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            ApplyConfig::from_toml_str("workload_refs_path = "),
            Err(ConfigError::Parse { .. })
        ));
    }
}
