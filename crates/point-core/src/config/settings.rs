//! Controller settings and profile lookup.

use super::profile::{DEFAULT_INTERFACE, DEFAULT_IP, PortRange, Profile};
use crate::error::{ProfileError, Result};
use mediactl_infra_common::config::{load_settings, load_settings_from_str};
use mediactl_infra_common::logging::LoggingSettings;
use mediactl_sdp_core::PayloadTypePolicy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Prefix of environment overrides, e.g. `MEDIACTL_DEFAULT_IP`
pub const ENV_PREFIX: &str = "MEDIACTL";

const DEFAULT_MQ: &str = "redis://127.0.0.1/media-controller";
const LOCAL_PROFILE: &str = "127.0.0.1:* (127.0.0.1)";

/// Settings as read from file and environment
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Message bus url, `<protocol>://<server>[:port]/<channel>`
    pub mq: String,
    /// Address advertised by profiles that name no ip
    pub default_ip: String,
    /// Named profile strings; the empty name is the default profile
    pub profiles: HashMap<String, String>,
    pub payload_type_policy: PayloadTypePolicy,
    pub timer_interval_ms: u64,
    pub logging: LoggingSettings,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            mq: DEFAULT_MQ.to_string(),
            default_ip: DEFAULT_IP.to_string(),
            profiles: HashMap::new(),
            payload_type_policy: PayloadTypePolicy::default(),
            timer_interval_ms: 1000,
            logging: LoggingSettings::default(),
        }
    }
}

impl ControllerSettings {
    /// Load from an optional TOML file plus `MEDIACTL_*` overrides
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Ok(load_settings(file, ENV_PREFIX)?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(load_settings_from_str(text)?)
    }
}

/// Location of the message bus and the controller's own channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQueueUrl {
    pub protocol: String,
    pub server: String,
    pub port: Option<u16>,
    pub channel: String,
}

impl FromStr for MessageQueueUrl {
    type Err = ProfileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        static RE: OnceLock<Option<Regex>> = OnceLock::new();
        let invalid = || ProfileError::InvalidQueueUrl(s.to_string());
        let captures = RE
            .get_or_init(|| Regex::new(r"^(.+?)://(.+?)(?::(\d+))?(?:/(.+))?$").ok())
            .as_ref()
            .and_then(|re| re.captures(s))
            .ok_or_else(invalid)?;

        let port = match captures.get(3) {
            Some(port) => Some(port.as_str().parse::<u16>().map_err(|_| invalid())?),
            None => None,
        };
        Ok(Self {
            protocol: captures[1].to_string(),
            server: captures[2].to_string(),
            port,
            channel: captures.get(4).map_or("", |m| m.as_str()).to_string(),
        })
    }
}

impl fmt::Display for MessageQueueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}/{}", self.protocol, self.server, port, self.channel),
            None => write!(f, "{}://{}/{}", self.protocol, self.server, self.channel),
        }
    }
}

/// Validated configuration handed to the controller at startup
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    mq: MessageQueueUrl,
    profiles: HashMap<String, Profile>,
    payload_type_policy: PayloadTypePolicy,
    timer_interval: Duration,
    logging: LoggingSettings,
}

impl ControllerConfig {
    /// Parse every profile string; built-in profiles fill the gaps.
    pub fn from_settings(settings: &ControllerSettings) -> Result<Self> {
        let mut profiles = HashMap::new();
        profiles.insert(
            String::new(),
            Profile::parse(&format!("{}:* (0.0.0.0)", settings.default_ip), &settings.default_ip)?,
        );
        profiles.insert("local".to_string(), Profile::parse(LOCAL_PROFILE, &settings.default_ip)?);

        for (name, value) in &settings.profiles {
            let profile = Profile::parse(value, &settings.default_ip)?;
            debug!("Profile {:?}: {}", canonical_name(name), profile);
            profiles.insert(canonical_name(name).to_string(), profile);
        }

        Ok(Self {
            mq: settings.mq.parse()?,
            profiles,
            payload_type_policy: settings.payload_type_policy,
            timer_interval: Duration::from_millis(settings.timer_interval_ms.max(1)),
            logging: settings.logging.clone(),
        })
    }

    pub fn mq(&self) -> &MessageQueueUrl {
        &self.mq
    }

    /// Look a profile up by name; `profile`, `default` and `profile-default`
    /// name the default profile, `profile-<x>` names `<x>`.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(canonical_name(name))
    }

    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn payload_type_policy(&self) -> PayloadTypePolicy {
        self.payload_type_policy
    }

    pub fn timer_interval(&self) -> Duration {
        self.timer_interval
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.logging
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let local = Profile::new(DEFAULT_IP, PortRange::any(), DEFAULT_IP);
        let default = Profile::new(DEFAULT_IP, PortRange::any(), DEFAULT_INTERFACE);
        Self {
            mq: MessageQueueUrl {
                protocol: "redis".into(),
                server: "127.0.0.1".into(),
                port: None,
                channel: "media-controller".into(),
            },
            profiles: HashMap::from([(String::new(), default), ("local".to_string(), local)]),
            payload_type_policy: PayloadTypePolicy::default(),
            timer_interval: Duration::from_secs(1),
            logging: LoggingSettings::default(),
        }
    }
}

fn canonical_name(name: &str) -> &str {
    match name {
        "profile" | "default" | "profile-default" => "",
        other => other.strip_prefix("profile-").unwrap_or(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_profiles() {
        let config = ControllerConfig::from_settings(&ControllerSettings {
            default_ip: "192.0.2.1".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.profile("").unwrap().to_string(), "192.0.2.1:* (interface=0.0.0.0)");
        assert_eq!(config.profile("default"), config.profile(""));
        assert_eq!(config.profile("profile-default"), config.profile(""));
        assert_eq!(config.profile("local").unwrap().to_string(), "127.0.0.1:* (interface=127.0.0.1)");
        assert!(config.profile("external").is_none());
        assert_eq!(config.mq().channel, "media-controller");
    }

    #[test]
    fn test_profiles_from_toml() {
        let settings = ControllerSettings::from_toml(
            r#"
            mq = "amqp://10.0.0.5:5672/mc-1"
            default_ip = "10.0.0.9"
            payload_type_policy = "per-session"
            timer_interval_ms = 500

            [profiles]
            profile = "10.0.0.9:40000-40100"
            profile-external = "40000-49999 (0.0.0.0)"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        let config = ControllerConfig::from_settings(&settings).unwrap();

        assert_eq!(config.profile("").unwrap().port_range.to_string(), "40000-40100");
        let external = config.profile("external").unwrap();
        assert_eq!((external.ip.as_str(), external.port_range.start()), ("10.0.0.9", 40000));
        assert_eq!(config.payload_type_policy(), PayloadTypePolicy::PerSession);
        assert_eq!(config.timer_interval(), Duration::from_millis(500));
        assert_eq!(config.logging().level, "debug");
        assert_eq!(config.mq().to_string(), "amqp://10.0.0.5:5672/mc-1");
        assert_eq!(config.profile_names(), vec!["", "external", "local"]);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let settings = ControllerSettings {
            profiles: HashMap::from([("broken".to_string(), "nope".to_string())]),
            ..Default::default()
        };
        assert!(ControllerConfig::from_settings(&settings).unwrap_err().is_semantic());
    }

    #[test]
    fn test_queue_url() {
        let url: MessageQueueUrl = "redis://127.0.0.1/media-controller".parse().unwrap();
        assert_eq!(url.port, None);
        assert_eq!(url.channel, "media-controller");
        assert!("no-scheme".parse::<MessageQueueUrl>().is_err());
    }
}
