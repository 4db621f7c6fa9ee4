//! CPython backend
//!
//! Binds [`Runtime`] to the CPython C API through `pyo3-ffi`. Every function
//! here must be called with the GIL held, which is the case inside a module
//! init function invoked by the import machinery.

use std::ffi::{CStr, CString};
use std::mem;
use std::ptr::{self, NonNull};

pub use pyo3_ffi as ffi;

use crate::config::ModuleConfig;
use crate::runtime::{Runtime, Truth};

// Method objects are part of the C API but have no pyo3-ffi bindings.
extern "C" {
    static mut PyMethod_Type: ffi::PyTypeObject;
    static mut PyInstanceMethod_Type: ffi::PyTypeObject;
    fn PyMethod_Function(method: *mut ffi::PyObject) -> *mut ffi::PyObject;
    fn PyInstanceMethod_Function(method: *mut ffi::PyObject) -> *mut ffi::PyObject;
}

/// Exact type test, as the `Py*_Check` macros for method objects do it
unsafe fn has_type(obj: *mut ffi::PyObject, ty: *mut ffi::PyTypeObject) -> bool {
    ffi::Py_TYPE(obj) == ty
}

/// The CPython interpreter of the current process
#[derive(Debug, Clone, Copy)]
pub enum CPython {}

unsafe impl Runtime for CPython {
    type Object = ffi::PyObject;
    type ModuleDef = ffi::PyModuleDef;

    unsafe fn incref(obj: *mut ffi::PyObject) {
        ffi::Py_XINCREF(obj);
    }

    unsafe fn decref(obj: *mut ffi::PyObject) {
        ffi::Py_XDECREF(obj);
    }

    unsafe fn refcount(obj: *mut ffi::PyObject) -> isize {
        ffi::Py_REFCNT(obj)
    }

    fn true_object() -> *mut ffi::PyObject {
        unsafe { ffi::Py_True() }
    }

    fn false_object() -> *mut ffi::PyObject {
        unsafe { ffi::Py_False() }
    }

    unsafe fn truth_value(obj: *mut ffi::PyObject) -> Truth {
        let truth = Truth::from_c_int(ffi::PyObject_IsTrue(obj));
        if truth == Truth::Indeterminate {
            // The failure is reported as an empty view; a pending exception
            // would otherwise surface at an unrelated later call.
            ffi::PyErr_Clear();
        }
        truth
    }

    unsafe fn is_callable(obj: *mut ffi::PyObject) -> bool {
        ffi::PyCallable_Check(obj) != 0
    }

    unsafe fn instance_method_function(obj: *mut ffi::PyObject) -> Option<NonNull<ffi::PyObject>> {
        if has_type(obj, ptr::addr_of_mut!(PyInstanceMethod_Type)) {
            NonNull::new(PyInstanceMethod_Function(obj))
        } else {
            None
        }
    }

    unsafe fn bound_method_function(obj: *mut ffi::PyObject) -> Option<NonNull<ffi::PyObject>> {
        if has_type(obj, ptr::addr_of_mut!(PyMethod_Type)) {
            NonNull::new(PyMethod_Function(obj))
        } else {
            None
        }
    }

    fn alloc_module_def(config: &ModuleConfig) -> Option<NonNull<ffi::PyModuleDef>> {
        let name = CString::new(config.name.as_str()).ok()?;
        let doc = CString::new(config.doc.as_str()).ok()?;

        // SAFETY: plain allocation; checked for null before use.
        let raw = unsafe { ffi::PyObject_Malloc(mem::size_of::<ffi::PyModuleDef>()) };
        let def = NonNull::new(raw.cast::<ffi::PyModuleDef>())?;

        // The definition and its strings must outlive the module, which lives
        // until interpreter shutdown, so they are never freed.
        unsafe {
            def.as_ptr().write(ffi::PyModuleDef {
                m_base: ffi::PyModuleDef_HEAD_INIT,
                m_name: name.into_raw(),
                m_doc: doc.into_raw(),
                m_size: -1,
                m_methods: ptr::null_mut(),
                m_slots: ptr::null_mut(),
                m_traverse: None,
                m_clear: None,
                m_free: None,
            });
        }
        Some(def)
    }

    unsafe fn create_module(def: NonNull<ffi::PyModuleDef>) -> *mut ffi::PyObject {
        ffi::PyModule_Create(def.as_ptr())
    }

    fn version() -> String {
        // SAFETY: `Py_GetVersion` returns a static NUL-terminated string.
        unsafe { CStr::from_ptr(ffi::Py_GetVersion()) }
            .to_string_lossy()
            .into_owned()
    }

    fn compiled_version() -> Option<String> {
        option_env!("PYGLU_COMPILED_PYTHON").map(str::to_owned)
    }
}

/// Set `ImportError(message)` unless an exception is already pending.
///
/// Loaders treat a null return from an init function as failure and expect
/// an exception to explain it.
///
/// # Safety
///
/// The GIL must be held.
pub unsafe fn raise_import_error(message: &str) {
    if !ffi::PyErr_Occurred().is_null() {
        return;
    }
    let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
    ffi::PyErr_SetString(ffi::PyExc_ImportError, message.as_ptr());
}
