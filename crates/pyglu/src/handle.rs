//! Reference-counted handles to foreign objects
//!
//! A [`Handle`] owns exactly one reference to one foreign object, or nothing.
//! Foreign APIs hand out pointers under two conventions, and a handle is
//! always created through the one that matches:
//!
//! - **borrow** ([`Handle::from_borrowed`], [`Borrow`]): the caller keeps its
//!   own reference, so the handle increments.
//! - **steal** ([`Handle::from_owned`], [`Steal`]): the caller gives its
//!   reference away, so the handle does not increment and the caller must not
//!   decrement afterwards.
//!
//! Cloning borrows, [`Handle::take`] steals (leaving the source empty), and
//! dropping decrements. Every assignment builds a complete temporary first
//! and then swaps it in, so a failure while building leaves the target
//! untouched.
//!
//! ## Threading
//!
//! Counts are adjusted with plain, non-atomic arithmetic. A `Handle` is
//! neither `Send` nor `Sync`, and all handles must be used from the thread
//! that holds the interpreter (CPython: the GIL holder). Sharing one across
//! threads requires external serialization and is not expressible with this
//! type.

use std::convert::Infallible;
use std::fmt;
use std::mem;
use std::ptr;

use tracing::trace;

use crate::runtime::Runtime;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Borrow {}
    impl Sealed for super::Steal {}
}

/// Ownership convention of a raw pointer being wrapped
pub trait Protocol: sealed::Sealed + Copy + fmt::Debug {
    /// Wrap `ptr` under this convention.
    ///
    /// # Safety
    ///
    /// See [`Handle::from_borrowed`] and [`Handle::from_owned`].
    unsafe fn wrap<R: Runtime>(ptr: *mut R::Object) -> Handle<R>;
}

/// The caller keeps its reference; the handle takes a new one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Borrow;

/// The caller hands its reference over to the handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Steal;

impl Protocol for Borrow {
    unsafe fn wrap<R: Runtime>(ptr: *mut R::Object) -> Handle<R> {
        Handle::from_borrowed(ptr)
    }
}

impl Protocol for Steal {
    unsafe fn wrap<R: Runtime>(ptr: *mut R::Object) -> Handle<R> {
        Handle::from_owned(ptr)
    }
}

/// Owning handle to one foreign object (or to nothing)
pub struct Handle<R: Runtime> {
    ptr: *mut R::Object,
}

impl<R: Runtime> Handle<R> {
    /// A handle that owns nothing
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
        }
    }

    /// Wrap `ptr`, taking a new reference if it is non-null.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live object of runtime `R`.
    pub unsafe fn from_borrowed(ptr: *mut R::Object) -> Self {
        if !ptr.is_null() {
            R::incref(ptr);
            trace!(ptr = ?ptr, "handle: borrow");
        }
        Self { ptr }
    }

    /// Wrap `ptr`, taking over the reference the caller owns.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live object of runtime `R`, and the
    /// caller must own a reference to it which it does not use again.
    pub unsafe fn from_owned(ptr: *mut R::Object) -> Self {
        Self { ptr }
    }

    /// Wrap `ptr` under an explicit ownership convention.
    ///
    /// ```ignore
    /// let a = unsafe { Handle::<CPython>::with_protocol(new_ref, Steal) };
    /// let b = unsafe { Handle::<CPython>::with_protocol(borrowed_ref, Borrow) };
    /// ```
    ///
    /// # Safety
    ///
    /// Same as the constructor `P` selects.
    pub unsafe fn with_protocol<P: Protocol>(ptr: *mut R::Object, _protocol: P) -> Self {
        P::wrap(ptr)
    }

    /// The raw pointer, without touching ownership.
    ///
    /// The result is only valid while this handle still owns it: dropping,
    /// taking from, or assigning to the handle may invalidate it.
    pub fn as_ptr(&self) -> *mut R::Object {
        self.ptr
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_null()
    }

    /// Give up the reference without decrementing it.
    ///
    /// The handle becomes empty and the caller now owns the returned
    /// reference (and its eventual decrement).
    pub fn release(&mut self) -> *mut R::Object {
        mem::replace(&mut self.ptr, ptr::null_mut())
    }

    /// Consume the handle, returning its reference to the caller
    pub fn into_raw(mut self) -> *mut R::Object {
        self.release()
    }

    /// Move the reference into a new handle, leaving this one empty.
    /// Never changes the count.
    pub fn take(&mut self) -> Self {
        // SAFETY: `release` hands us the reference this handle owned.
        unsafe { Self::from_owned(self.release()) }
    }

    /// Exchange pointers with `other`. Never changes a count.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
    }

    /// Replace the contents of `self` with the handle `make` builds.
    ///
    /// The new handle is fully constructed before `self` is touched; when
    /// `make` fails, `self` keeps its pointer and its reference.
    pub fn try_assign_with<E, F>(&mut self, make: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<Self, E>,
    {
        let mut tmp = make()?;
        self.swap(&mut tmp);
        Ok(())
    }

    /// Move-assign: take `source`'s reference (leaving it empty) and release
    /// whatever `self` held before.
    pub fn assign_from(&mut self, source: &mut Self) {
        let mut tmp = source.take();
        self.swap(&mut tmp);
    }

    /// Current count of the object, `None` when empty (diagnostics only)
    pub fn refcount(&self) -> Option<isize> {
        if self.ptr.is_null() {
            None
        } else {
            // SAFETY: a non-null handle keeps its object alive.
            Some(unsafe { R::refcount(self.ptr) })
        }
    }

    /// Whether both handles point at the same object (or are both empty)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ptr::eq(self.ptr, other.ptr)
    }
}

/// Exchange the pointers of two handles without touching any count
pub fn swap<R: Runtime>(a: &mut Handle<R>, b: &mut Handle<R>) {
    a.swap(b);
}

impl<R: Runtime> Clone for Handle<R> {
    fn clone(&self) -> Self {
        // SAFETY: `self` keeps its object alive for the duration of the call.
        unsafe { Self::from_borrowed(self.ptr) }
    }

    fn clone_from(&mut self, source: &Self) {
        let _ = self.try_assign_with(|| Ok::<_, Infallible>(source.clone()));
    }
}

impl<R: Runtime> Drop for Handle<R> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            trace!(ptr = ?self.ptr, "handle: release");
            // SAFETY: this handle owns one reference to a live object.
            unsafe { R::decref(self.ptr) };
        }
    }
}

impl<R: Runtime> Default for Handle<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Runtime> PartialEq for Handle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<R: Runtime> Eq for Handle<R> {}

impl<R: Runtime> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.refcount() {
            None => write!(f, "Handle(<empty>)"),
            Some(count) => write!(f, "Handle({:p}, refcnt={})", self.ptr, count),
        }
    }
}
