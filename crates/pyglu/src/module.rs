//! Namespace construction
//!
//! [`Module::new`] runs once, at extension initialization. Nobody above it can
//! retry, so its failures are structured errors rather than an empty view.
//! The created module is normally released straight to the interpreter's
//! loader, which owns it from then on.

use std::fmt;
use std::ops::Deref;

use tracing::{debug, error};

use crate::config::ModuleConfig;
use crate::convert::View;
use crate::error::{GluError, GluResult};
use crate::handle::Handle;
use crate::runtime::Runtime;

/// A handle guaranteed to hold a module object, or nothing
pub struct Module<R: Runtime> {
    handle: Handle<R>,
    config: ModuleConfig,
}

impl<R: Runtime> Module<R> {
    /// Allocate a definition for `config` and materialize a module from it.
    ///
    /// The returned view owns the only reference to the new module.
    pub fn new(config: &ModuleConfig) -> GluResult<Self> {
        config.validate()?;

        let def = R::alloc_module_def(config).ok_or_else(|| {
            error!(module = %config.name, "module definition allocation failed");
            GluError::module_def_alloc(config.name.as_str())
        })?;

        // SAFETY: `def` was just allocated by this runtime.
        let ptr = unsafe { R::create_module(def) };
        if ptr.is_null() {
            error!(module = %config.name, "runtime failed to create module");
            return Err(GluError::module_create(config.name.as_str()));
        }

        // SAFETY: `create_module` returns a new reference.
        let handle = unsafe { Handle::from_owned(ptr) };
        debug!(module = %config.name, refcount = ?handle.refcount(), "module created");
        Ok(Self {
            handle,
            config: config.clone(),
        })
    }

    /// Name the module was created with; empty for the empty view
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn doc(&self) -> &str {
        &self.config.doc
    }
}

impl<R: Runtime> View<R> for Module<R> {
    const CAPABILITY: &'static str = "module";

    fn empty() -> Self {
        Self {
            handle: Handle::empty(),
            config: ModuleConfig::new(""),
        }
    }

    fn as_handle(&self) -> &Handle<R> {
        &self.handle
    }

    fn into_handle(self) -> Handle<R> {
        self.handle
    }
}

impl<R: Runtime> Clone for Module<R> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: Runtime> Deref for Module<R> {
    type Target = Handle<R>;

    fn deref(&self) -> &Handle<R> {
        &self.handle
    }
}

impl<R: Runtime> fmt::Debug for Module<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.config.name)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{FailPoint, SimKind, SimRuntime};
    use pretty_assertions::assert_eq;

    type M = Module<SimRuntime>;

    #[test]
    fn test_new_module_has_single_reference() {
        let module = M::new(&ModuleConfig::new("example").with_doc("docs")).unwrap();
        assert!(module.is_valid());
        assert_eq!(module.refcount(), Some(1));
        assert_eq!(module.name(), "example");
        assert_eq!(module.doc(), "docs");

        let obj = unsafe { SimRuntime::object(module.as_ptr()) };
        match obj.kind() {
            SimKind::Module { name, doc } => {
                assert_eq!(name, "example");
                assert_eq!(doc, "docs");
            }
            other => panic!("expected a module, got {:?}", other),
        }
    }

    #[test]
    fn test_release_hands_reference_to_caller() {
        let before = SimRuntime::live_objects();
        let raw = M::new(&ModuleConfig::default()).unwrap().release();
        assert!(!raw.is_null());
        assert_eq!(unsafe { SimRuntime::refcount(raw) }, 1);
        assert_eq!(SimRuntime::live_objects(), before + 1);
        unsafe { SimRuntime::decref(raw) };
        assert_eq!(SimRuntime::live_objects(), before);
    }

    #[test]
    fn test_def_alloc_failure() {
        SimRuntime::fail_next(FailPoint::ModuleDefAlloc);
        let err = M::new(&ModuleConfig::new("example")).unwrap_err();
        assert!(matches!(err, GluError::ModuleDefAlloc { .. }));
    }

    #[test]
    fn test_create_failure_leaks_nothing() {
        let before = SimRuntime::live_objects();
        SimRuntime::fail_next(FailPoint::ModuleCreate);
        let err = M::new(&ModuleConfig::new("example")).unwrap_err();
        assert!(matches!(err, GluError::ModuleCreate { .. }));
        assert_eq!(SimRuntime::live_objects(), before);
    }

    #[test]
    fn test_invalid_config_rejected_before_runtime() {
        SimRuntime::fail_next(FailPoint::ModuleDefAlloc);
        let err = M::new(&ModuleConfig::new("")).unwrap_err();
        assert!(err.is_config_error());
        // The failure point was never reached.
        SimRuntime::clear_failures();
    }

    #[test]
    fn test_empty_view() {
        let module = M::empty();
        assert!(!module.is_valid());
        assert_eq!(module.name(), "");
        assert!(module.release().is_null());
    }
}
