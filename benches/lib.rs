//! pyglu Benchmarks
//!
//! Performance benchmarks for handle refcount traffic and capability
//! conversions, measured against the simulated runtime.
//! Run with: cargo bench -p pyglu-benchmarks

// This file exists only to satisfy Cargo's requirement for a lib target.
// The actual benchmarks are in handle_benchmarks.rs and conversion_benchmarks.rs
