//! Extension initialization
//!
//! The interpreter's loader calls an extension's entry point exactly once and
//! expects a new reference to the extension's module back. [`init_extension`]
//! does the work behind that entry point: version diagnostics, an optional
//! version check, and construction of the single [`Module`].

use tracing::{error, info, warn};

use crate::config::ExtensionConfig;
use crate::convert::View;
use crate::error::{GluError, GluResult};
use crate::module::Module;
use crate::runtime::{parse_major_minor, Runtime};

/// Build the extension's module and return its reference for the loader.
///
/// On success the caller owns the returned (non-null) reference; loaders take
/// it over as the module object.
pub fn init_extension<R: Runtime>(config: &ExtensionConfig) -> GluResult<*mut R::Object> {
    let running = R::version();
    let compiled = R::compiled_version();
    info!(
        module = %config.module.name,
        compiled = ?compiled,
        running = %running,
        required = ?config.require_version,
        "initializing extension"
    );
    if compiled_differs(compiled.as_deref(), &running) {
        warn!(compiled = ?compiled, %running, "extension built against another interpreter");
    }

    check_version(config, &running)?;

    let module = Module::<R>::new(&config.module)?;
    Ok(module.release())
}

/// Compare the configured `major.minor` requirement with a version string
pub fn check_version(config: &ExtensionConfig, running: &str) -> GluResult<()> {
    let Some(required) = config.required_major_minor()? else {
        return Ok(());
    };
    let actual = parse_major_minor(running).ok_or_else(|| GluError::invalid_version(running))?;
    if actual != required {
        let required = format!("{}.{}", required.0, required.1);
        error!(%required, %running, "interpreter version mismatch");
        return Err(GluError::version_mismatch(required, running));
    }
    Ok(())
}

/// Whether the build-time and running `major.minor` are both known and differ
fn compiled_differs(compiled: Option<&str>, running: &str) -> bool {
    match (compiled.and_then(parse_major_minor), parse_major_minor(running)) {
        (Some(compiled), Some(running)) => compiled != running,
        _ => false,
    }
}
