//! Shared infrastructure for the mediactl workspace.
//!
//! This crate carries the pieces every other crate leans on but that have
//! nothing to do with SDP or call control:
//!
//! * [`logging`] - `tracing` subscriber bootstrap
//! * [`config`] - layered settings loading (TOML file, then environment)
//! * [`errors`] - the error type returned by the above

pub mod config;
pub mod errors;
pub mod logging;

pub use errors::{Error, Result};
