//! The foreign runtime seam
//!
//! Everything pyglu knows about the interpreter goes through [`Runtime`].
//! Implementors expose the interpreter's reference counting, a handful of
//! type queries, and module construction as associated functions, because an
//! embedded interpreter is process-global (or, for [`SimRuntime`], thread-global)
//! state rather than a value we hold.
//!
//! ## Threading
//!
//! Implementations may assume a single writer at any instant. None of the
//! functions here synchronize; CPython requires the GIL to be held for every
//! call.
//!
//! [`SimRuntime`]: crate::sim::SimRuntime

use std::fmt;
use std::ptr::NonNull;

use crate::config::ModuleConfig;

/// Outcome of asking the runtime for an object's truth value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    /// Definitely true
    True,
    /// Definitely false
    False,
    /// The coercion failed (CPython: `PyObject_IsTrue` returned -1)
    Indeterminate,
}

impl Truth {
    /// Map a C-style tri-state (`1`, `0`, anything else) to a [`Truth`]
    pub fn from_c_int(value: i32) -> Self {
        match value {
            1 => Truth::True,
            0 => Truth::False,
            _ => Truth::Indeterminate,
        }
    }

    /// The host boolean, if the answer was definite
    pub fn definite(self) -> Option<bool> {
        match self {
            Truth::True => Some(true),
            Truth::False => Some(false),
            Truth::Indeterminate => None,
        }
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Truth::True => write!(f, "True"),
            Truth::False => write!(f, "False"),
            Truth::Indeterminate => write!(f, "Indeterminate"),
        }
    }
}

/// Capabilities required of an embedded reference-counted interpreter.
///
/// # Safety
///
/// Implementors guarantee that `incref`/`decref` maintain the interpreter's
/// count exactly, that the truth singletons stay alive for the life of the
/// interpreter, and that `create_module` returns a new (owned) reference.
pub unsafe trait Runtime: 'static {
    /// Layout of a foreign object (`PyObject` for CPython)
    type Object;

    /// Layout of a module definition record (`PyModuleDef` for CPython)
    type ModuleDef;

    /// Increment the count of `obj`. Null is a no-op.
    ///
    /// # Safety
    ///
    /// `obj` must be null or point to a live object of this runtime.
    unsafe fn incref(obj: *mut Self::Object);

    /// Decrement the count of `obj`, possibly freeing it. Null is a no-op.
    ///
    /// # Safety
    ///
    /// `obj` must be null or point to a live object, and the caller must own
    /// the reference being given up.
    unsafe fn decref(obj: *mut Self::Object);

    /// Current count of `obj` (diagnostics only).
    ///
    /// # Safety
    ///
    /// `obj` must point to a live object.
    unsafe fn refcount(obj: *mut Self::Object) -> isize;

    /// Borrowed pointer to the `True` singleton
    fn true_object() -> *mut Self::Object;

    /// Borrowed pointer to the `False` singleton
    fn false_object() -> *mut Self::Object;

    /// Coerce `obj` to a truth value.
    ///
    /// # Safety
    ///
    /// `obj` must point to a live object.
    unsafe fn truth_value(obj: *mut Self::Object) -> Truth;

    /// Whether `obj` can be invoked directly.
    ///
    /// # Safety
    ///
    /// `obj` must point to a live object.
    unsafe fn is_callable(obj: *mut Self::Object) -> bool;

    /// If `obj` is a bound instance method, its underlying function (borrowed).
    ///
    /// # Safety
    ///
    /// `obj` must point to a live object.
    unsafe fn instance_method_function(obj: *mut Self::Object) -> Option<NonNull<Self::Object>>;

    /// If `obj` is a bound class method, its underlying function (borrowed).
    ///
    /// # Safety
    ///
    /// `obj` must point to a live object.
    unsafe fn bound_method_function(obj: *mut Self::Object) -> Option<NonNull<Self::Object>>;

    /// Allocate a module definition record carrying the configured name and
    /// doc string and an "arbitrary size" marker (no per-module state).
    /// The record must outlive every module created from it.
    fn alloc_module_def(config: &ModuleConfig) -> Option<NonNull<Self::ModuleDef>>;

    /// Materialize a module from `def`. Returns a new reference, or null.
    ///
    /// # Safety
    ///
    /// `def` must come from [`Runtime::alloc_module_def`] of this runtime.
    unsafe fn create_module(def: NonNull<Self::ModuleDef>) -> *mut Self::Object;

    /// Human-readable version of the running interpreter (e.g. `"3.12.1 (main, ...)"`)
    fn version() -> String;

    /// `major.minor` of the interpreter headers this backend was built
    /// against, when the backend knows it
    fn compiled_version() -> Option<String> {
        None
    }
}

/// `major.minor` prefix of an interpreter version string.
///
/// Accepts anything that starts with digits, a dot and digits, like
/// `"3.12"`, `"3.12.1"` or `"3.12.1 (main, Jan 1 2024)"`.
pub fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let head = version.split_whitespace().next()?;
    let mut parts = head.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor_raw = parts.next()?;
    let digits: String = minor_raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    let minor = digits.parse().ok()?;
    Some((major, minor))
}
