//! INI configuration file.

use std::path::Path;

use ini::Ini;
use tracing::debug;

use crate::logging::LoggingConfig;
use crate::tunnel::TunnelConfig;

use super::error::ConfigError;
use super::keys::ConfigKey;
use super::config_file_path;

/// Contents of `config.ini`.
///
/// Keys missing from the file keep their defaults. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// `[tunnel]`, `[qualification]` and `[simulation]` sections.
    pub tunnel: TunnelConfig,
    /// `[logging]` section.
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse INI text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        config.tunnel.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Render as INI text. Unset optional keys are omitted.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = ini.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, self.to_ini_string()).map_err(write_error)
    }

    /// The validated tunnel policy.
    pub fn tunnel_config(&self) -> Result<TunnelConfig, ConfigError> {
        self.tunnel.validate().map_err(ConfigError::Invalid)?;
        Ok(self.tunnel.clone())
    }
}
