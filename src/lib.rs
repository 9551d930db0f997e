//! Automated installer front-end for Pydio Cells.
//!
//! See [`install::bootstrap`] for the entry point used by the binary.

pub mod config;
pub mod install;
