use crate::errors::{Error, Result};
use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Builder over the `config` crate sources used by mediactl binaries
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    inline: Option<String>,
    env_prefix: Option<String>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            inline: None,
            env_prefix: None,
        }
    }

    /// Read a TOML file. A missing file is an error.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read TOML text directly, layered after the file.
    pub fn with_toml(mut self, text: impl Into<String>) -> Self {
        self.inline = Some(text.into());
        self
    }

    /// Let `<PREFIX>_*` environment variables override file values.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "settings file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }

        if let Some(text) = &self.inline {
            builder = builder.add_source(File::from_str(text, FileFormat::Toml));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let settings = builder.build()?.try_deserialize::<T>()?;
        tracing::debug!(
            "Loaded settings (file={:?}, env_prefix={:?})",
            self.file,
            self.env_prefix
        );
        Ok(settings)
    }
}

/// Load settings from an optional file plus `<env_prefix>_*` overrides.
pub fn load_settings<T: DeserializeOwned>(file: Option<&Path>, env_prefix: &str) -> Result<T> {
    let mut loader = SettingsLoader::new().with_env_prefix(env_prefix);
    if let Some(path) = file {
        loader = loader.with_file(path);
    }
    loader.load()
}

/// Load settings from TOML text only. No environment overrides apply.
pub fn load_settings_from_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    SettingsLoader::new().with_toml(text).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default)]
        profiles: HashMap<String, String>,
        #[serde(default)]
        port: u16,
    }

    #[test]
    fn test_load_from_str() {
        let sample: Sample = load_settings_from_str(
            r#"
            name = "mc"
            port = 5000

            [profiles]
            local = "127.0.0.1:*"
            "#,
        )
        .unwrap();

        assert_eq!(sample.name, "mc");
        assert_eq!(sample.port, 5000);
        assert_eq!(sample.profiles.get("local").map(String::as_str), Some("127.0.0.1:*"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "name = \"from-file\"").unwrap();

        let sample: Sample = load_settings(Some(file.path()), "MEDIACTL_INFRA_TEST").unwrap();
        assert_eq!(sample.name, "from-file");
        assert!(sample.profiles.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result: Result<Sample> = load_settings(Some(Path::new("/nonexistent/mediactl.toml")), "X");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_required_key() {
        let result: Result<Sample> = load_settings_from_str("port = 1");
        assert!(result.is_err());
    }
}
