//! I/O helpers: configuration, host catalog, output location, TDESC files.

pub mod catalog;
pub mod config;
pub mod export_root;
pub mod output;
pub mod tdesc;
