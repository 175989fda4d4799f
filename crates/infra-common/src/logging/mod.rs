//! Logging bootstrap built on `tracing-subscriber`.

mod setup;

pub use setup::{LoggingConfig, LoggingSettings, log_welcome, parse_log_level, setup_logging};
