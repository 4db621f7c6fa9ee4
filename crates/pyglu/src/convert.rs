//! Capability views and the conversion protocol
//!
//! A capability view is a [`Handle`] plus a guarantee checked once, when the
//! view is built: the object supports some behavior (truth testing,
//! invocation, namespace membership). A view is therefore in exactly one of
//! two states, *valid* or *empty*.
//!
//! Interpreting an arbitrary handle as a view goes through [`Convert`]:
//!
//! - [`Convert::convert`] is total. Any input that does not qualify yields
//!   the empty view; callers check [`View::is_valid`] before use.
//! - [`Convert::try_convert`] reports why: an empty input, a capability the
//!   object lacks, or a runtime that could not decide.

use tracing::debug;

use crate::error::ConvertError;
use crate::handle::Handle;
use crate::runtime::Runtime;

/// Common surface of the capability views
pub trait View<R: Runtime>: Sized {
    /// Short name used in diagnostics (`"bool"`, `"callable"`, ...)
    const CAPABILITY: &'static str;

    /// The invalid sentinel
    fn empty() -> Self;

    fn as_handle(&self) -> &Handle<R>;

    fn into_handle(self) -> Handle<R>;

    fn is_valid(&self) -> bool {
        !self.as_handle().is_empty()
    }

    /// Hand the underlying reference to the caller without decrementing it
    fn release(self) -> *mut R::Object {
        self.into_handle().into_raw()
    }
}

/// Fallible interpretation of a generic handle as a capability view
pub trait Convert<R: Runtime>: View<R> {
    fn try_convert(handle: &Handle<R>) -> Result<Self, ConvertError>;

    /// Total conversion: every failure becomes the empty view
    fn convert(handle: &Handle<R>) -> Self {
        match Self::try_convert(handle) {
            Ok(view) => view,
            Err(err) => {
                debug!(capability = Self::CAPABILITY, %err, "conversion yielded an empty view");
                Self::empty()
            }
        }
    }
}
