//! Addressable configuration keys.
//!
//! Every setting in the INI file has a [`ConfigKey`] that knows its section,
//! how to read it from a [`ConfigFile`] and how to parse and store a new
//! value. The file parser and writer are driven by this table, so adding a
//! key here is all it takes to expose it.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;
use super::file::ConfigFile;
use crate::tunnel::MAX_EXIT_UNQUALIFIED_THRESHOLD;

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    TunnelMinimumSpeedAtEntrance,
    TunnelMinimumDistanceToEntrance,
    TunnelExitUnqualifiedThreshold,
    TunnelNotificationTimeout,
    QualificationMaxHorizontalAccuracy,
    QualificationMaxAge,
    SimulationTickInterval,
    SimulationTimeScale,
    SimulationDefaultSpeed,
    SimulationMinSpeed,
    SimulationMaxSpeed,
    SimulationHorizontalAccuracy,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::TunnelMinimumSpeedAtEntrance,
            ConfigKey::TunnelMinimumDistanceToEntrance,
            ConfigKey::TunnelExitUnqualifiedThreshold,
            ConfigKey::TunnelNotificationTimeout,
            ConfigKey::QualificationMaxHorizontalAccuracy,
            ConfigKey::QualificationMaxAge,
            ConfigKey::SimulationTickInterval,
            ConfigKey::SimulationTimeScale,
            ConfigKey::SimulationDefaultSpeed,
            ConfigKey::SimulationMinSpeed,
            ConfigKey::SimulationMaxSpeed,
            ConfigKey::SimulationHorizontalAccuracy,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::TunnelMinimumSpeedAtEntrance
            | ConfigKey::TunnelMinimumDistanceToEntrance
            | ConfigKey::TunnelExitUnqualifiedThreshold
            | ConfigKey::TunnelNotificationTimeout => "tunnel",
            ConfigKey::QualificationMaxHorizontalAccuracy | ConfigKey::QualificationMaxAge => {
                "qualification"
            }
            ConfigKey::SimulationTickInterval
            | ConfigKey::SimulationTimeScale
            | ConfigKey::SimulationDefaultSpeed
            | ConfigKey::SimulationMinSpeed
            | ConfigKey::SimulationMaxSpeed
            | ConfigKey::SimulationHorizontalAccuracy => "simulation",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::TunnelMinimumSpeedAtEntrance => "minimum_speed_at_entrance_mps",
            ConfigKey::TunnelMinimumDistanceToEntrance => "minimum_distance_to_entrance_m",
            ConfigKey::TunnelExitUnqualifiedThreshold => "exit_unqualified_threshold",
            ConfigKey::TunnelNotificationTimeout => "notification_timeout_ms",
            ConfigKey::QualificationMaxHorizontalAccuracy => "max_horizontal_accuracy_m",
            ConfigKey::QualificationMaxAge => "max_age_ms",
            ConfigKey::SimulationTickInterval => "tick_interval_ms",
            ConfigKey::SimulationTimeScale => "time_scale",
            ConfigKey::SimulationDefaultSpeed => "default_speed_mps",
            ConfigKey::SimulationMinSpeed => "min_speed_mps",
            ConfigKey::SimulationMaxSpeed => "max_speed_mps",
            ConfigKey::SimulationHorizontalAccuracy => "horizontal_accuracy_m",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file. Empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let tunnel = &config.tunnel;
        match self {
            ConfigKey::TunnelMinimumSpeedAtEntrance => {
                tunnel.minimum_speed_at_entrance_mps.to_string()
            }
            ConfigKey::TunnelMinimumDistanceToEntrance => {
                tunnel.minimum_distance_to_entrance_m.to_string()
            }
            ConfigKey::TunnelExitUnqualifiedThreshold => {
                tunnel.exit_unqualified_threshold.to_string()
            }
            ConfigKey::TunnelNotificationTimeout => {
                tunnel.notification_timeout.as_millis().to_string()
            }
            ConfigKey::QualificationMaxHorizontalAccuracy => {
                tunnel.qualification.max_horizontal_accuracy_m.to_string()
            }
            ConfigKey::QualificationMaxAge => tunnel.qualification.max_age.as_millis().to_string(),
            ConfigKey::SimulationTickInterval => {
                tunnel.simulation.tick_interval.as_millis().to_string()
            }
            ConfigKey::SimulationTimeScale => tunnel.simulation.time_scale.to_string(),
            ConfigKey::SimulationDefaultSpeed => tunnel.simulation.default_speed_mps.to_string(),
            ConfigKey::SimulationMinSpeed => tunnel.simulation.min_speed_mps.to_string(),
            ConfigKey::SimulationMaxSpeed => tunnel.simulation.max_speed_mps.to_string(),
            ConfigKey::SimulationHorizontalAccuracy => {
                tunnel.simulation.horizontal_accuracy_m.to_string()
            }
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let tunnel = &mut config.tunnel;
        match self {
            ConfigKey::TunnelMinimumSpeedAtEntrance => {
                tunnel.minimum_speed_at_entrance_mps = self.non_negative(value)?
            }
            ConfigKey::TunnelMinimumDistanceToEntrance => {
                tunnel.minimum_distance_to_entrance_m = self.non_negative(value)?
            }
            ConfigKey::TunnelExitUnqualifiedThreshold => {
                let threshold = self.count(value)?;
                if threshold > MAX_EXIT_UNQUALIFIED_THRESHOLD {
                    return Err(self.invalid(
                        value,
                        &format!("must be at most {}", MAX_EXIT_UNQUALIFIED_THRESHOLD),
                    ));
                }
                tunnel.exit_unqualified_threshold = threshold
            }
            ConfigKey::TunnelNotificationTimeout => {
                tunnel.notification_timeout = self.millis(value, false)?
            }
            ConfigKey::QualificationMaxHorizontalAccuracy => {
                tunnel.qualification.max_horizontal_accuracy_m = self.non_negative(value)?
            }
            ConfigKey::QualificationMaxAge => {
                tunnel.qualification.max_age = self.millis(value, false)?
            }
            ConfigKey::SimulationTickInterval => {
                tunnel.simulation.tick_interval = self.millis(value, true)?
            }
            ConfigKey::SimulationTimeScale => {
                let scale = self.non_negative(value)?;
                if scale == 0.0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                tunnel.simulation.time_scale = scale;
            }
            ConfigKey::SimulationDefaultSpeed => {
                tunnel.simulation.default_speed_mps = self.non_negative(value)?
            }
            ConfigKey::SimulationMinSpeed => {
                tunnel.simulation.min_speed_mps = self.non_negative(value)?
            }
            ConfigKey::SimulationMaxSpeed => {
                tunnel.simulation.max_speed_mps = self.non_negative(value)?
            }
            ConfigKey::SimulationHorizontalAccuracy => {
                tunnel.simulation.horizontal_accuracy_m = self.non_negative(value)?
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn non_negative(&self, value: &str) -> Result<f64, ConfigError> {
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            Ok(_) => Err(self.invalid(value, "must be a non-negative number")),
            Err(_) => Err(self.invalid(value, "expected a number")),
        }
    }

    fn count(&self, value: &str) -> Result<usize, ConfigError> {
        value
            .parse::<usize>()
            .map_err(|_| self.invalid(value, "expected a non-negative integer"))
    }

    fn millis(&self, value: &str, nonzero: bool) -> Result<Duration, ConfigError> {
        let ms = value
            .parse::<u64>()
            .map_err(|_| self.invalid(value, "expected milliseconds as an integer"))?;
        if nonzero && ms == 0 {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(Duration::from_millis(ms))
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<String> = ConfigKey::all().iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
    }

    #[test]
    fn test_parse_key_name() {
        let key: ConfigKey = "tunnel.exit_unqualified_threshold".parse().unwrap();
        assert_eq!(key, ConfigKey::TunnelExitUnqualifiedThreshold);
        assert_eq!(key.section(), "tunnel");

        let key: ConfigKey = " Simulation.Time_Scale ".parse().unwrap();
        assert_eq!(key, ConfigKey::SimulationTimeScale);

        assert!(matches!(
            "tunnel.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut config = ConfigFile::default();
        ConfigKey::TunnelNotificationTimeout
            .set(&mut config, "1500")
            .unwrap();
        assert_eq!(config.tunnel.notification_timeout, Duration::from_millis(1500));
        assert_eq!(ConfigKey::TunnelNotificationTimeout.get(&config), "1500");

        ConfigKey::LoggingFile.set(&mut config, "/tmp/nav.log").unwrap();
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/nav.log")));
        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert_eq!(ConfigKey::LoggingFile.get(&config), "");
    }

    #[test]
    fn test_set_rejects_bad_values_with_key_name() {
        let mut config = ConfigFile::default();

        let err = ConfigKey::TunnelMinimumDistanceToEntrance
            .set(&mut config, "-3")
            .unwrap_err();
        assert!(err.to_string().contains("tunnel.minimum_distance_to_entrance_m"));

        let err = ConfigKey::SimulationTickInterval
            .set(&mut config, "0")
            .unwrap_err();
        assert!(err.to_string().contains("simulation.tick_interval_ms"));

        assert!(ConfigKey::SimulationTimeScale.set(&mut config, "fast").is_err());

        let err = ConfigKey::TunnelExitUnqualifiedThreshold
            .set(&mut config, "18446744073709551615")
            .unwrap_err();
        assert!(err.to_string().contains("tunnel.exit_unqualified_threshold"));
        assert_eq!(config.tunnel.exit_unqualified_threshold, 3);
        assert!(ConfigKey::TunnelExitUnqualifiedThreshold
            .set(&mut config, "2.5")
            .is_err());
        assert_eq!(config, ConfigFile::default());
    }
}
