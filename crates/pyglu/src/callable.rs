//! Invocable-object view

use std::fmt;
use std::ops::Deref;

use tracing::debug;

use crate::convert::{Convert, View};
use crate::error::ConvertError;
use crate::handle::{Handle, Protocol};
use crate::runtime::Runtime;

/// A handle guaranteed to hold a directly invocable object, or nothing
pub struct Callable<R: Runtime> {
    handle: Handle<R>,
}

impl<R: Runtime> Callable<R> {
    /// Take ownership of `handle` if its object is invocable.
    ///
    /// A rejected handle is dropped here, which releases whatever reference it
    /// carried: a borrowed object ends with no net change, an owned reference
    /// is given back to the runtime.
    pub fn from_handle(handle: Handle<R>) -> Self {
        if handle.is_empty() {
            return Self::empty();
        }
        // SAFETY: a non-empty handle keeps its object alive.
        if unsafe { R::is_callable(handle.as_ptr()) } {
            Self { handle }
        } else {
            debug!(ptr = ?handle.as_ptr(), "rejected non-callable object");
            Self::empty()
        }
    }

    /// Validate `handle` without consuming it
    pub fn new(handle: &Handle<R>) -> Self {
        Self::from_handle(handle.clone())
    }

    /// Borrow `ptr` if it is invocable.
    ///
    /// # Safety
    ///
    /// As [`Handle::from_borrowed`].
    pub unsafe fn from_borrowed(ptr: *mut R::Object) -> Self {
        Self::from_handle(Handle::from_borrowed(ptr))
    }

    /// Steal `ptr`; if it is not invocable the stolen reference is released.
    ///
    /// # Safety
    ///
    /// As [`Handle::from_owned`].
    pub unsafe fn from_owned(ptr: *mut R::Object) -> Self {
        Self::from_handle(Handle::from_owned(ptr))
    }

    /// Wrap `ptr` under an explicit ownership convention.
    ///
    /// # Safety
    ///
    /// Same as the constructor `P` selects.
    pub unsafe fn with_protocol<P: Protocol>(ptr: *mut R::Object, protocol: P) -> Self {
        Self::from_handle(Handle::with_protocol(ptr, protocol))
    }
}

impl<R: Runtime> View<R> for Callable<R> {
    const CAPABILITY: &'static str = "callable";

    fn empty() -> Self {
        Self {
            handle: Handle::empty(),
        }
    }

    fn as_handle(&self) -> &Handle<R> {
        &self.handle
    }

    fn into_handle(self) -> Handle<R> {
        self.handle
    }
}

impl<R: Runtime> Convert<R> for Callable<R> {
    /// Bound instance methods and bound class methods are unwrapped to their
    /// underlying function. Every other object, invocable or not, gives
    /// `Unsupported`; wrap those with [`Callable::new`] instead.
    fn try_convert(handle: &Handle<R>) -> Result<Self, ConvertError> {
        if handle.is_empty() {
            return Err(ConvertError::Empty);
        }
        let ptr = handle.as_ptr();

        // SAFETY: `handle` keeps `ptr` alive, and the method keeps its
        // function alive for the duration of the borrow below.
        let function = unsafe {
            match R::instance_method_function(ptr) {
                Some(function) => Some(function),
                None => R::bound_method_function(ptr),
            }
        };
        let unsupported = ConvertError::Unsupported {
            capability: Self::CAPABILITY,
        };
        let Some(function) = function else {
            return Err(unsupported);
        };

        let callable = unsafe { Self::from_borrowed(function.as_ptr()) };
        if callable.is_valid() {
            Ok(callable)
        } else {
            Err(unsupported)
        }
    }
}

impl<R: Runtime> Default for Callable<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Runtime> Clone for Callable<R> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<R: Runtime> Deref for Callable<R> {
    type Target = Handle<R>;

    fn deref(&self) -> &Handle<R> {
        &self.handle
    }
}

impl<R: Runtime> fmt::Debug for Callable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.handle).finish()
    }
}
