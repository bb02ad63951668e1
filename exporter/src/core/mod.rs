//! Deterministic, in-memory building blocks.
//!
//! Core modules must be free of I/O side effects: side tables, operation
//! interception, and the types shared between the host adapter and the
//! exporter.

pub mod attribute;
pub mod injection;
pub mod intercept;
pub mod namespace;
pub mod types;
