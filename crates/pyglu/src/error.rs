//! Error Types
//!
//! Two disjoint regimes live here:
//!
//! - [`ConvertError`]: why a capability conversion produced no view. The total
//!   `convert` entry points fold every variant into the empty sentinel; the
//!   `try_convert` entry points surface the reason.
//! - [`GluError`]: structured failures of extension initialization and
//!   configuration, which have no caller able to retry.

use thiserror::Error;

/// Result type for initialization and configuration
pub type GluResult<T> = Result<T, GluError>;

/// Why a handle could not be interpreted as a capability view
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    /// The input handle owned nothing
    #[error("cannot convert an empty handle")]
    Empty,

    /// The object does not support the capability
    #[error("object does not support the {capability} capability")]
    Unsupported {
        /// Name of the requested capability
        capability: &'static str,
    },

    /// The runtime could not decide (e.g. truth coercion raised)
    #[error("runtime could not determine the {capability} capability")]
    Indeterminate {
        /// Name of the requested capability
        capability: &'static str,
    },
}

impl ConvertError {
    /// The capability was positively checked and is absent
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ConvertError::Unsupported { .. })
    }

    /// The runtime failed while checking
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, ConvertError::Indeterminate { .. })
    }
}

/// Initialization and configuration errors
#[derive(Error, Debug, Clone)]
pub enum GluError {
    /// The runtime could not allocate a module definition record
    #[error("failed to allocate module definition for '{module_name}'")]
    ModuleDefAlloc {
        /// Name of the module being defined
        module_name: String,
    },

    /// The runtime refused to materialize a module from its definition
    #[error("failed to create module '{module_name}'")]
    ModuleCreate {
        /// Name of the module being created
        module_name: String,
    },

    /// The running interpreter does not match the required version
    #[error("interpreter version mismatch: required {required}, running {running}")]
    VersionMismatch {
        /// Required `major.minor`
        required: String,
        /// Version string reported by the runtime
        running: String,
    },

    /// A version string could not be parsed as `major.minor[.micro]`
    #[error("invalid version string '{version}'")]
    InvalidVersion {
        /// The offending string
        version: String,
    },

    /// Configuration is syntactically valid but unusable
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong
        message: String,
    },

    /// Configuration file could not be read or parsed
    #[error("failed to load configuration: {message}")]
    ConfigLoad {
        /// Underlying cause
        message: String,
    },
}

impl GluError {
    /// Create a module definition allocation error
    pub fn module_def_alloc(module_name: impl Into<String>) -> Self {
        GluError::ModuleDefAlloc {
            module_name: module_name.into(),
        }
    }

    /// Create a module creation error
    pub fn module_create(module_name: impl Into<String>) -> Self {
        GluError::ModuleCreate {
            module_name: module_name.into(),
        }
    }

    /// Create a version mismatch error
    pub fn version_mismatch(required: impl Into<String>, running: impl Into<String>) -> Self {
        GluError::VersionMismatch {
            required: required.into(),
            running: running.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        GluError::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        GluError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a configuration load error
    pub fn config_load(message: impl Into<String>) -> Self {
        GluError::ConfigLoad {
            message: message.into(),
        }
    }

    /// Check if this error came from the runtime during module setup
    pub fn is_module_error(&self) -> bool {
        matches!(
            self,
            GluError::ModuleDefAlloc { .. } | GluError::ModuleCreate { .. }
        )
    }

    /// Check if this error came from configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            GluError::InvalidConfig { .. } | GluError::ConfigLoad { .. }
        )
    }
}

impl From<toml::de::Error> for GluError {
    fn from(err: toml::de::Error) -> Self {
        GluError::config_load(err.to_string())
    }
}

impl From<std::io::Error> for GluError {
    fn from(err: std::io::Error) -> Self {
        GluError::config_load(err.to_string())
    }
}
