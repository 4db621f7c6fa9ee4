//! Extension configuration
//!
//! An extension is described by a small TOML document:
//!
//! ```toml
//! require-version = "3.12"
//!
//! [module]
//! name = "example"
//! doc = "An example extension"
//! ```
//!
//! Every field is optional; the defaults describe the `example` module with an
//! empty doc string and no version requirement.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{GluError, GluResult};
use crate::runtime::parse_major_minor;

/// Name used when no configuration says otherwise
pub const DEFAULT_MODULE_NAME: &str = "example";

/// Name and doc string of the module an extension creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: SmolStr,
    #[serde(default)]
    pub doc: SmolStr,
}

impl ModuleConfig {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            doc: SmolStr::default(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<SmolStr>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Names and doc strings cross into C, so they must be NUL-free.
    pub fn validate(&self) -> GluResult<()> {
        if self.name.is_empty() {
            return Err(GluError::invalid_config("module name is empty"));
        }
        if self.name.contains('\0') {
            return Err(GluError::invalid_config(format!(
                "module name {:?} contains a NUL byte",
                self.name
            )));
        }
        if self.doc.contains('\0') {
            return Err(GluError::invalid_config(format!(
                "doc string of module '{}' contains a NUL byte",
                self.name
            )));
        }
        Ok(())
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_NAME)
    }
}

/// Everything the extension entry point needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionConfig {
    /// Required interpreter `major.minor`; checked against the running interpreter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_version: Option<String>,
    #[serde(default)]
    pub module: ModuleConfig,
}

impl ExtensionConfig {
    pub fn new(module: ModuleConfig) -> Self {
        Self {
            module,
            require_version: None,
        }
    }

    pub fn with_required_version(mut self, version: impl Into<String>) -> Self {
        self.require_version = Some(version.into());
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> GluResult<Self> {
        let config: ExtensionConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> GluResult<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> GluResult<()> {
        self.module.validate()?;
        self.required_major_minor()?;
        Ok(())
    }

    /// The parsed version requirement, if one is configured
    pub fn required_major_minor(&self) -> GluResult<Option<(u32, u32)>> {
        match &self.require_version {
            None => Ok(None),
            Some(version) => parse_major_minor(version)
                .map(Some)
                .ok_or_else(|| GluError::invalid_version(version.clone())),
        }
    }
}
