//! End-to-end initialization of the `example` module on the simulated runtime.

use std::cell::RefCell;

use pretty_assertions::assert_eq;

use example::{config, init, init_for_loader};
use pyglu::sim::{FailPoint, SimKind};
use pyglu::{Runtime, SimRuntime};

#[test]
fn test_embedded_config() {
    let config = config().unwrap();
    assert_eq!(config.module.name, "example");
    assert_eq!(config.module.doc, "");
    assert_eq!(config.require_version, None);
}

#[test]
fn test_init_creates_example_module_with_one_reference() {
    let before = SimRuntime::live_objects();
    let module = init::<SimRuntime>().unwrap();

    assert!(!module.is_null());
    unsafe {
        assert_eq!(SimRuntime::refcount(module), 1);
        match SimRuntime::object(module).kind() {
            SimKind::Module { name, .. } => assert_eq!(name, "example"),
            other => panic!("expected a module, got {:?}", other),
        }
        SimRuntime::decref(module);
    }
    assert_eq!(SimRuntime::live_objects(), before);
}

#[test]
fn test_loader_boundary_success_reports_nothing() {
    let reported = RefCell::new(None::<String>);
    let module = init_for_loader::<SimRuntime>(|message| {
        *reported.borrow_mut() = Some(message.to_string());
    });

    assert!(!module.is_null());
    assert_eq!(*reported.borrow(), None);
    unsafe { SimRuntime::decref(module) };
}

#[test]
fn test_loader_boundary_failure_returns_null_and_reports() {
    SimRuntime::fail_next(FailPoint::ModuleCreate);
    let reported = RefCell::new(None::<String>);
    let module = init_for_loader::<SimRuntime>(|message| {
        *reported.borrow_mut() = Some(message.to_string());
    });

    assert!(module.is_null());
    assert_eq!(
        reported.borrow().as_deref(),
        Some("failed to create module 'example'")
    );
}
