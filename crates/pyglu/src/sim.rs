//! Simulated Interpreter
//!
//! [`SimRuntime`] is a small in-process stand-in for an embedded interpreter.
//! Objects live on the Rust heap behind real raw pointers and carry real
//! counts: they are freed when the count reaches zero, and inner references
//! (a method's function and receiver) are released with them. This makes the
//! runtime suitable for checking refcount discipline in tests and benchmarks
//! without linking an interpreter.
//!
//! ## Design Notes
//!
//! The heap is thread-local: every thread sees its own interpreter with its
//! own `True`/`False` singletons. This mirrors the single-writer model of a
//! GIL-protected interpreter without any locking.
//!
//! Failure points ([`FailPoint`]) are one-shot switches that make the next
//! matching runtime call fail, so error paths can be exercised.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ptr::{self, NonNull};

use smol_str::SmolStr;
use tracing::trace;

use crate::config::ModuleConfig;
use crate::runtime::{Runtime, Truth};

/// Version string reported until [`SimRuntime::set_version`] is called
pub const DEFAULT_SIM_VERSION: &str = "3.12.4 (pyglu simulated runtime)";

/// Interpreter version the simulated runtime claims to be built against
pub const SIM_COMPILED_VERSION: &str = "3.12";

/// Module state size meaning "no per-module state block"
pub const ARBITRARY_SIZE: isize = -1;

// ============================================================================
// Objects
// ============================================================================

/// What a simulated object is
#[derive(Debug)]
pub enum SimKind {
    /// A truth singleton
    Bool(bool),
    Int(i64),
    Str(SmolStr),
    /// A plain function; directly invokable
    Function { name: SmolStr },
    /// A bound instance method holding a reference to its function
    InstanceMethod { function: *mut SimObject },
    /// A bound class method holding references to its function and receiver
    BoundMethod {
        function: *mut SimObject,
        receiver: *mut SimObject,
    },
    /// A namespace created from a module definition
    Module { name: SmolStr, doc: SmolStr },
    /// An instance with a user-defined truth hook; `None` means the hook raises
    Opaque { truth: Option<bool> },
}

impl SimKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SimKind::Bool(_) => "bool",
            SimKind::Int(_) => "int",
            SimKind::Str(_) => "str",
            SimKind::Function { .. } => "function",
            SimKind::InstanceMethod { .. } => "instancemethod",
            SimKind::BoundMethod { .. } => "method",
            SimKind::Module { .. } => "module",
            SimKind::Opaque { .. } => "object",
        }
    }
}

/// A heap-allocated simulated object
pub struct SimObject {
    refcnt: Cell<isize>,
    immortal: bool,
    kind: SimKind,
}

impl SimObject {
    pub fn kind(&self) -> &SimKind {
        &self.kind
    }

    pub fn refcnt(&self) -> isize {
        self.refcnt.get()
    }
}

impl fmt::Debug for SimObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} refcnt={}>", self.kind.type_name(), self.refcnt.get())
    }
}

/// Definition record a module is materialized from
#[derive(Debug)]
pub struct SimModuleDef {
    pub name: SmolStr,
    pub doc: SmolStr,
    pub size: isize,
}

/// Runtime call that a [`FailPoint`] makes fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// `alloc_module_def` returns `None`
    ModuleDefAlloc,
    /// `create_module` returns null
    ModuleCreate,
}

// ============================================================================
// Thread-local interpreter state
// ============================================================================

struct SimState {
    true_obj: *mut SimObject,
    false_obj: *mut SimObject,
    live: Cell<usize>,
    fail: Cell<Option<FailPoint>>,
    defs: RefCell<Vec<Box<SimModuleDef>>>,
    version: RefCell<String>,
}

impl SimState {
    fn new() -> Self {
        Self {
            true_obj: immortal(SimKind::Bool(true)),
            false_obj: immortal(SimKind::Bool(false)),
            live: Cell::new(0),
            fail: Cell::new(None),
            defs: RefCell::new(Vec::new()),
            version: RefCell::new(DEFAULT_SIM_VERSION.to_string()),
        }
    }

    fn take_failure(&self, point: FailPoint) -> bool {
        if self.fail.get() == Some(point) {
            self.fail.set(None);
            true
        } else {
            false
        }
    }
}

thread_local! {
    static STATE: SimState = SimState::new();
}

fn immortal(kind: SimKind) -> *mut SimObject {
    Box::into_raw(Box::new(SimObject {
        refcnt: Cell::new(1),
        immortal: true,
        kind,
    }))
}

/// Free `obj` and release the references it holds.
///
/// # Safety
///
/// `obj` must be a live, mortal object whose count just reached zero.
unsafe fn dealloc(obj: *mut SimObject) {
    let boxed = Box::from_raw(obj);
    trace!(kind = boxed.kind.type_name(), "sim: dealloc");
    STATE.with(|s| s.live.set(s.live.get().saturating_sub(1)));
    match boxed.kind {
        SimKind::InstanceMethod { function } => SimRuntime::decref(function),
        SimKind::BoundMethod { function, receiver } => {
            SimRuntime::decref(function);
            SimRuntime::decref(receiver);
        }
        _ => {}
    }
}

// ============================================================================
// SimRuntime
// ============================================================================

/// The simulated interpreter.
///
/// Constructors return new references (count 1) that the caller owns, the
/// same convention as the interpreter's C API.
#[derive(Debug, Clone, Copy)]
pub enum SimRuntime {}

impl SimRuntime {
    /// Allocate a mortal object. Returns a new reference.
    pub fn alloc(kind: SimKind) -> *mut SimObject {
        STATE.with(|s| s.live.set(s.live.get() + 1));
        Box::into_raw(Box::new(SimObject {
            refcnt: Cell::new(1),
            immortal: false,
            kind,
        }))
    }

    pub fn new_int(value: i64) -> *mut SimObject {
        Self::alloc(SimKind::Int(value))
    }

    pub fn new_str(value: impl Into<SmolStr>) -> *mut SimObject {
        Self::alloc(SimKind::Str(value.into()))
    }

    pub fn new_function(name: impl Into<SmolStr>) -> *mut SimObject {
        Self::alloc(SimKind::Function { name: name.into() })
    }

    pub fn new_opaque(truth: Option<bool>) -> *mut SimObject {
        Self::alloc(SimKind::Opaque { truth })
    }

    /// Wrap `function` as a bound instance method.
    ///
    /// # Safety
    ///
    /// `function` must be a live object; it is borrowed (incremented).
    pub unsafe fn new_instance_method(function: *mut SimObject) -> *mut SimObject {
        Self::incref(function);
        Self::alloc(SimKind::InstanceMethod { function })
    }

    /// Bind `function` to `receiver`.
    ///
    /// # Safety
    ///
    /// Both pointers must be live objects; both are borrowed (incremented).
    pub unsafe fn new_bound_method(
        function: *mut SimObject,
        receiver: *mut SimObject,
    ) -> *mut SimObject {
        Self::incref(function);
        Self::incref(receiver);
        Self::alloc(SimKind::BoundMethod { function, receiver })
    }

    /// Number of mortal objects currently alive on this thread
    pub fn live_objects() -> usize {
        STATE.with(|s| s.live.get())
    }

    /// Make the next call matching `point` fail
    pub fn fail_next(point: FailPoint) {
        STATE.with(|s| s.fail.set(Some(point)));
    }

    /// Disarm any pending failure point
    pub fn clear_failures() {
        STATE.with(|s| s.fail.set(None));
    }

    /// Change the version string reported by [`Runtime::version`]
    pub fn set_version(version: impl Into<String>) {
        STATE.with(|s| *s.version.borrow_mut() = version.into());
    }

    pub fn reset_version() {
        Self::set_version(DEFAULT_SIM_VERSION);
    }

    /// Borrow the object behind `obj`.
    ///
    /// # Safety
    ///
    /// `obj` must point to a live object, and the returned reference must not
    /// outlive it.
    pub unsafe fn object<'a>(obj: *mut SimObject) -> &'a SimObject {
        &*obj
    }
}

unsafe impl Runtime for SimRuntime {
    type Object = SimObject;
    type ModuleDef = SimModuleDef;

    unsafe fn incref(obj: *mut SimObject) {
        if obj.is_null() {
            return;
        }
        let count = &(*obj).refcnt;
        count.set(count.get() + 1);
    }

    /// # Panics
    ///
    /// Panics when a count would drop below zero: some handle gave up a
    /// reference it never owned.
    unsafe fn decref(obj: *mut SimObject) {
        if obj.is_null() {
            return;
        }
        let count = &(*obj).refcnt;
        let next = count.get() - 1;
        if next < 0 {
            panic!("refcount underflow on {} object", (*obj).kind.type_name());
        }
        count.set(next);
        if next == 0 && !(*obj).immortal {
            dealloc(obj);
        }
    }

    unsafe fn refcount(obj: *mut SimObject) -> isize {
        (*obj).refcnt.get()
    }

    fn true_object() -> *mut SimObject {
        STATE.with(|s| s.true_obj)
    }

    fn false_object() -> *mut SimObject {
        STATE.with(|s| s.false_obj)
    }

    unsafe fn truth_value(obj: *mut SimObject) -> Truth {
        let truth = match &(*obj).kind {
            SimKind::Bool(b) => Some(*b),
            SimKind::Int(n) => Some(*n != 0),
            SimKind::Str(s) => Some(!s.is_empty()),
            SimKind::Opaque { truth } => *truth,
            SimKind::Function { .. }
            | SimKind::InstanceMethod { .. }
            | SimKind::BoundMethod { .. }
            | SimKind::Module { .. } => Some(true),
        };
        match truth {
            Some(true) => Truth::True,
            Some(false) => Truth::False,
            None => Truth::Indeterminate,
        }
    }

    unsafe fn is_callable(obj: *mut SimObject) -> bool {
        matches!(
            (*obj).kind,
            SimKind::Function { .. } | SimKind::InstanceMethod { .. } | SimKind::BoundMethod { .. }
        )
    }

    unsafe fn instance_method_function(obj: *mut SimObject) -> Option<NonNull<SimObject>> {
        match (*obj).kind {
            SimKind::InstanceMethod { function } => NonNull::new(function),
            _ => None,
        }
    }

    unsafe fn bound_method_function(obj: *mut SimObject) -> Option<NonNull<SimObject>> {
        match (*obj).kind {
            SimKind::BoundMethod { function, .. } => NonNull::new(function),
            _ => None,
        }
    }

    fn alloc_module_def(config: &ModuleConfig) -> Option<NonNull<SimModuleDef>> {
        STATE.with(|s| {
            if s.take_failure(FailPoint::ModuleDefAlloc) {
                return None;
            }
            let mut def = Box::new(SimModuleDef {
                name: config.name.clone(),
                doc: config.doc.clone(),
                size: ARBITRARY_SIZE,
            });
            let ptr = NonNull::from(def.as_mut());
            s.defs.borrow_mut().push(def);
            Some(ptr)
        })
    }

    unsafe fn create_module(def: NonNull<SimModuleDef>) -> *mut SimObject {
        if STATE.with(|s| s.take_failure(FailPoint::ModuleCreate)) {
            return ptr::null_mut();
        }
        let def = def.as_ref();
        Self::alloc(SimKind::Module {
            name: def.name.clone(),
            doc: def.doc.clone(),
        })
    }

    fn version() -> String {
        STATE.with(|s| s.version.borrow().clone())
    }

    fn compiled_version() -> Option<String> {
        Some(SIM_COMPILED_VERSION.to_string())
    }
}
