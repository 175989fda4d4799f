//! Layered settings loading.
//!
//! Settings are read from an optional TOML file and then overridden by
//! environment variables carrying the given prefix. Nested keys use a double
//! underscore, so `MEDIACTL_LOGGING__LEVEL=debug` sets `logging.level`.

mod loader;

pub use loader::{SettingsLoader, load_settings, load_settings_from_str};
