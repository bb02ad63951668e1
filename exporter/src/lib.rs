//! TDESC exporter for sealed tuning classes.
//!
//! The host's `TunableBase` has a fixed slot layout, so the fields the
//! exporter needs are kept in identity-keyed side tables and filled by a
//! wrapped constructor. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (side tables, operation
//!   interception, namespace types). No I/O.
//! - **[`io`]**: Side-effecting operations (config and catalog files, output
//!   root discovery, TDESC files, progress output).
//!
//! [`host`] models the host runtime the exporter reads from, and [`export`]
//! coordinates a single `export_tdesc` run.

pub mod core;
pub mod exit_codes;
pub mod export;
pub mod host;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
