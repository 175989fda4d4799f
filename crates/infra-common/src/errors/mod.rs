//! Error types for infrastructure bootstrap.

mod types;

pub use types::{Error, Result};
