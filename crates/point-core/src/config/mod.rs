//! Controller configuration: network profiles, port ranges and the settings
//! loaded at startup.

mod profile;
mod settings;

pub use profile::{DEFAULT_INTERFACE, DEFAULT_IP, DEFAULT_MAX_PORT, DEFAULT_MIN_PORT, PortPairs, PortRange, Profile};
pub use settings::{ControllerConfig, ControllerSettings, ENV_PREFIX, MessageQueueUrl};
