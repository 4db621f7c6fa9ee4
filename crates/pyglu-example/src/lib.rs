//! The `example` extension module
//!
//! When built with the `cpython` feature this crate is a loadable CPython
//! extension: `import example` calls [`PyInit_example`], which creates the
//! module described by `example.toml` and hands it to the import machinery.
//!
//! The init logic itself is generic over [`Runtime`] so it can be exercised
//! against the simulated runtime.

use std::panic;
use std::ptr;

use pyglu::{init_extension, ExtensionConfig, GluResult, Runtime};
use tracing::error;

/// Configuration compiled into the extension
pub const CONFIG: &str = include_str!("../example.toml");

pub fn config() -> GluResult<ExtensionConfig> {
    ExtensionConfig::from_toml_str(CONFIG)
}

/// Create the extension's module; the caller owns the returned reference
pub fn init<R: Runtime>() -> GluResult<*mut R::Object> {
    let config = config()?;
    init_extension::<R>(&config)
}

/// Run [`init`] at the loader boundary.
///
/// Errors and panics must not cross into C: both become a null return, and
/// `on_error` is given a message to report through the runtime.
pub fn init_for_loader<R: Runtime>(on_error: impl FnOnce(&str)) -> *mut R::Object {
    match panic::catch_unwind(init::<R>) {
        Ok(Ok(module)) => module,
        Ok(Err(err)) => {
            error!(%err, "extension initialization failed");
            on_error(&err.to_string());
            ptr::null_mut()
        }
        Err(_) => {
            error!("extension initialization panicked");
            on_error("extension initialization panicked");
            ptr::null_mut()
        }
    }
}

/// Entry point called by `import example`
#[cfg(feature = "cpython")]
#[no_mangle]
pub extern "C" fn PyInit_example() -> *mut pyglu::cpython::ffi::PyObject {
    init_for_loader::<pyglu::cpython::CPython>(|message| {
        // SAFETY: the import machinery holds the GIL while calling init.
        unsafe { pyglu::cpython::raise_import_error(message) }
    })
}
