//! Truth-value view
//!
//! A valid [`Boolean`] always holds one of the runtime's two truth
//! singletons. Converting any other object asks the runtime for its truth
//! value and swaps in the matching singleton.

use std::fmt;
use std::ops::Deref;

use crate::convert::{Convert, View};
use crate::error::ConvertError;
use crate::handle::Handle;
use crate::runtime::{Runtime, Truth};

/// A handle guaranteed to hold `True` or `False`, or nothing
pub struct Boolean<R: Runtime> {
    handle: Handle<R>,
}

impl<R: Runtime> Boolean<R> {
    pub fn new(value: bool) -> Self {
        let singleton = if value {
            R::true_object()
        } else {
            R::false_object()
        };
        Self {
            // SAFETY: the singletons live as long as the runtime.
            handle: unsafe { Handle::from_borrowed(singleton) },
        }
    }

    /// The empty view
    pub fn null() -> Self {
        Self {
            handle: Handle::empty(),
        }
    }

    /// `true` only when this holds the `True` singleton; empty is `false`
    pub fn to_bool(&self) -> bool {
        !self.handle.is_empty() && self.handle.as_ptr() == R::true_object()
    }
}

impl<R: Runtime> View<R> for Boolean<R> {
    const CAPABILITY: &'static str = "bool";

    fn empty() -> Self {
        Self::null()
    }

    fn as_handle(&self) -> &Handle<R> {
        &self.handle
    }

    fn into_handle(self) -> Handle<R> {
        self.handle
    }
}

impl<R: Runtime> Convert<R> for Boolean<R> {
    fn try_convert(handle: &Handle<R>) -> Result<Self, ConvertError> {
        if handle.is_empty() {
            return Err(ConvertError::Empty);
        }
        // SAFETY: a non-empty handle keeps its object alive.
        match unsafe { R::truth_value(handle.as_ptr()) } {
            Truth::True => Ok(Self::new(true)),
            Truth::False => Ok(Self::new(false)),
            Truth::Indeterminate => Err(ConvertError::Indeterminate {
                capability: Self::CAPABILITY,
            }),
        }
    }
}

impl<R: Runtime> Default for Boolean<R> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<R: Runtime> From<bool> for Boolean<R> {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl<R: Runtime> From<Boolean<R>> for bool {
    fn from(value: Boolean<R>) -> Self {
        value.to_bool()
    }
}

impl<R: Runtime> Clone for Boolean<R> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<R: Runtime> Deref for Boolean<R> {
    type Target = Handle<R>;

    fn deref(&self) -> &Handle<R> {
        &self.handle
    }
}

impl<R: Runtime> fmt::Debug for Boolean<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.handle.is_empty() {
            write!(f, "Boolean(<empty>)")
        } else {
            write!(f, "Boolean({})", if self.to_bool() { "True" } else { "False" })
        }
    }
}
