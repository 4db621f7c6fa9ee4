//! The CPython backend against a live interpreter.

#![cfg(feature = "cpython")]

use std::ffi::{CStr, CString};
use std::sync::Once;

use pretty_assertions::assert_eq;

use pyglu::cpython::{ffi, CPython};
use pyglu::runtime::parse_major_minor;
use pyglu::{
    init_extension, Boolean, Callable, Convert, ExtensionConfig, Handle, Module, ModuleConfig,
    Runtime, View,
};

extern "C" {
    fn PyMethod_New(
        function: *mut ffi::PyObject,
        receiver: *mut ffi::PyObject,
    ) -> *mut ffi::PyObject;
}

type H = Handle<CPython>;

const FIXTURES: &str = r#"
class Unsure:
    def __bool__(self):
        raise ValueError("no truth value")

class Receiver:
    pass

def function(self):
    return self

unsure = Unsure()
receiver = Receiver()
"#;

/// Run `body` with the GIL held, starting the interpreter on first use
fn with_interpreter<T>(body: impl FnOnce() -> T) -> T {
    static START: Once = Once::new();
    START.call_once(|| unsafe {
        ffi::Py_InitializeEx(0);
        ffi::PyEval_SaveThread();
    });

    let gil = unsafe { ffi::PyGILState_Ensure() };
    let result = body();
    unsafe { ffi::PyGILState_Release(gil) };
    result
}

/// Execute the fixtures and return their namespace
fn fixtures() -> H {
    let code = CString::new(FIXTURES).unwrap();
    unsafe {
        let globals = H::from_owned(ffi::PyDict_New());
        let result = ffi::PyRun_String(
            code.as_ptr(),
            ffi::Py_file_input,
            globals.as_ptr(),
            globals.as_ptr(),
        );
        assert!(!result.is_null(), "fixtures failed to run");
        ffi::Py_DECREF(result);
        globals
    }
}

fn lookup(namespace: &H, name: &str) -> H {
    let key = CString::new(name).unwrap();
    let item = unsafe { ffi::PyDict_GetItemString(namespace.as_ptr(), key.as_ptr()) };
    assert!(!item.is_null(), "{name} missing from namespace");
    unsafe { H::from_borrowed(item) }
}

#[test]
fn test_module_starts_with_one_reference() {
    with_interpreter(|| {
        let module = Module::<CPython>::new(&ModuleConfig::new("pyglu_backend")).unwrap();
        assert!(module.is_valid());
        assert_eq!(module.refcount(), Some(1));

        let name = unsafe { CStr::from_ptr(ffi::PyModule_GetName(module.as_ptr())) };
        assert_eq!(name.to_str().unwrap(), "pyglu_backend");
    });
}

#[test]
fn test_init_extension_hands_over_module() {
    with_interpreter(|| {
        let raw = init_extension::<CPython>(&ExtensionConfig::default()).unwrap();
        assert!(!raw.is_null());
        let module = unsafe { H::from_owned(raw) };
        assert_eq!(module.refcount(), Some(1));
    });
}

#[test]
fn test_compiled_version_matches_running() {
    with_interpreter(|| {
        let compiled = CPython::compiled_version().unwrap();
        assert_eq!(parse_major_minor(&compiled), parse_major_minor(&CPython::version()));
    });
}

#[test]
fn test_callable_convert_unwraps_bound_method() {
    with_interpreter(|| {
        let namespace = fixtures();
        let function = lookup(&namespace, "function");
        let receiver = lookup(&namespace, "receiver");
        let method = unsafe { H::from_owned(PyMethod_New(function.as_ptr(), receiver.as_ptr())) };
        assert!(!method.is_empty());

        let before = function.refcount().unwrap();
        let view = Callable::convert(&method);
        assert!(view.ptr_eq(&function));
        assert_eq!(function.refcount(), Some(before + 1));

        drop(view);
        assert_eq!(function.refcount(), Some(before));
    });
}

#[test]
fn test_callable_convert_rejects_plain_function() {
    with_interpreter(|| {
        let namespace = fixtures();
        let function = lookup(&namespace, "function");
        let before = function.refcount();

        assert!(!Callable::convert(&function).is_valid());
        assert_eq!(function.refcount(), before);
        assert!(Callable::new(&function).is_valid());
    });
}

#[test]
fn test_boolean_convert_clears_truth_error() {
    with_interpreter(|| {
        let namespace = fixtures();
        let unsure = lookup(&namespace, "unsure");

        let view = Boolean::convert(&unsure);
        assert!(!view.is_valid());
        assert!(!view.to_bool());
        assert!(unsafe { ffi::PyErr_Occurred() }.is_null());

        let receiver = lookup(&namespace, "receiver");
        assert!(Boolean::convert(&receiver).to_bool());
    });
}
