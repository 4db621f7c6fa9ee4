//! # pyglu
//!
//! Reference-counted handles and capability views over an embedded
//! interpreter with manual reference counting (CPython, or the simulated
//! runtime used in tests).
//!
//! ## Overview
//!
//! Foreign objects arrive as raw pointers under one of two conventions: the
//! caller either keeps its reference (borrow) or hands it over (steal).
//! Getting this wrong leaks or double-frees. This crate provides:
//!
//! - [`Handle`]: owns exactly one reference, created through an explicit
//!   protocol ([`Borrow`] or [`Steal`]), with exception-safe assignment
//! - Capability views built on it: [`Boolean`], [`Callable`], [`Module`]
//! - The conversion protocol ([`Convert`]): any handle becomes a valid view
//!   or the empty sentinel, never an error
//! - [`init_extension`]: the body of an extension's loader entry point
//!
//! ## Threading
//!
//! Nothing here is thread-safe. Handles and views are `!Send` and `!Sync`,
//! counts are adjusted with plain arithmetic, and every call must happen on
//! the thread that holds the interpreter (the GIL holder for CPython).
//!
//! ## Module Structure
//!
//! - [`runtime`]: the trait an interpreter backend implements
//! - [`handle`]: the ownership wrapper
//! - [`convert`]: view traits and the conversion protocol
//! - [`boolean`], [`callable`], [`module`]: the capability views
//! - [`init`]: extension initialization
//! - [`config`]: extension configuration (TOML)
//! - [`error`]: error types
//! - [`sim`]: an in-process simulated interpreter
//! - `cpython`: the CPython backend (feature `cpython`)

pub mod boolean;
pub mod callable;
pub mod config;
pub mod convert;
#[cfg(feature = "cpython")]
pub mod cpython;
pub mod error;
pub mod handle;
pub mod init;
pub mod module;
pub mod runtime;
pub mod sim;

// Re-export main types for convenience
pub use boolean::Boolean;
pub use callable::Callable;
pub use config::{ExtensionConfig, ModuleConfig};
pub use convert::{Convert, View};
pub use error::{ConvertError, GluError, GluResult};
pub use handle::{Borrow, Handle, Protocol, Steal};
pub use init::init_extension;
pub use module::Module;
pub use runtime::{Runtime, Truth};
pub use sim::SimRuntime;
