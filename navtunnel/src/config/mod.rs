//! Configuration file support.
//!
//! Settings live in an INI file under the platform config directory:
//!
//! ```ini
//! [tunnel]
//! minimum_speed_at_entrance_mps = 5
//! minimum_distance_to_entrance_m = 50
//! exit_unqualified_threshold = 3
//! notification_timeout_ms = 5000
//!
//! [qualification]
//! max_horizontal_accuracy_m = 100
//! max_age_ms = 10000
//!
//! [simulation]
//! tick_interval_ms = 1000
//! time_scale = 1
//! default_speed_mps = 13.9
//! min_speed_mps = 2
//! max_speed_mps = 40
//! horizontal_accuracy_m = 5
//!
//! [logging]
//! level = info
//! file = /path/to/navtunnel.log
//! ```

mod error;
mod file;
mod keys;

use std::path::PathBuf;

pub use error::ConfigError;
pub use file::ConfigFile;
pub use keys::ConfigKey;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Directory holding navtunnel configuration.
///
/// Falls back to the working directory when the platform has no config
/// directory.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("navtunnel")
}

/// Path of the default configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path_shape() {
        let path = config_file_path();
        assert!(path.ends_with("navtunnel/config.ini"));
    }
}
