//! Policy configuration for tunnel detection and the animation hand-off.
//!
//! All thresholds are fixed for the lifetime of a
//! [`TunnelIntersectionManager`](super::TunnelIntersectionManager); build a
//! new manager to change them.
//!
//! # Units
//!
//! | Field | Unit |
//! |-------|------|
//! | `minimum_speed_at_entrance_mps` | meters per second |
//! | `minimum_distance_to_entrance_m` | meters |
//! | `exit_unqualified_threshold` | samples |

use std::time::Duration;

use crate::location::QualificationConfig;
use crate::simulation::SimulationConfig;

/// Minimum speed that triggers anticipation inside the entrance radius (m/s).
pub const DEFAULT_MINIMUM_SPEED_AT_TUNNEL_ENTRANCE_MPS: f64 = 5.0;

/// Distance to a tunnel intersection below which the entrance radius applies (m).
pub const DEFAULT_MINIMUM_DISTANCE_TO_TUNNEL_ENTRANCE_M: f64 = 50.0;

/// Animation exits once more than this many unqualified samples are buffered.
pub const DEFAULT_EXIT_UNQUALIFIED_THRESHOLD: usize = 3;

/// Largest accepted exit threshold.
pub const MAX_EXIT_UNQUALIFIED_THRESHOLD: usize = 64;

/// Longest a notification sink may defer a transition.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable policy for the tunnel manager.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelConfig {
    /// Speed at or above which a user inside the entrance radius triggers
    /// simulation.
    pub minimum_speed_at_entrance_mps: f64,

    /// Radius before a tunnel intersection within which anticipation starts.
    ///
    /// The comparison is strict: exactly this distance does not trigger.
    pub minimum_distance_to_entrance_m: f64,

    /// Unqualified samples tolerated before exiting without a good fix.
    ///
    /// At most [`MAX_EXIT_UNQUALIFIED_THRESHOLD`].
    pub exit_unqualified_threshold: usize,

    /// Upper bound on a notification sink deferral.
    pub notification_timeout: Duration,

    /// Thresholds for the default accuracy qualifier.
    pub qualification: QualificationConfig,

    /// Simulated feed parameters.
    pub simulation: SimulationConfig,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            minimum_speed_at_entrance_mps: DEFAULT_MINIMUM_SPEED_AT_TUNNEL_ENTRANCE_MPS,
            minimum_distance_to_entrance_m: DEFAULT_MINIMUM_DISTANCE_TO_TUNNEL_ENTRANCE_M,
            exit_unqualified_threshold: DEFAULT_EXIT_UNQUALIFIED_THRESHOLD,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            qualification: QualificationConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl TunnelConfig {
    /// Set the entrance speed threshold.
    pub fn with_minimum_speed_at_entrance(mut self, mps: f64) -> Self {
        self.minimum_speed_at_entrance_mps = mps;
        self
    }

    /// Set the entrance radius.
    pub fn with_minimum_distance_to_entrance(mut self, meters: f64) -> Self {
        self.minimum_distance_to_entrance_m = meters;
        self
    }

    /// Set the unqualified-sample exit threshold.
    pub fn with_exit_unqualified_threshold(mut self, samples: usize) -> Self {
        self.exit_unqualified_threshold = samples;
        self
    }

    /// Set the notification deferral timeout.
    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Set the simulated feed parameters.
    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    /// Capacity of the exit buffer implied by the threshold.
    pub fn exit_buffer_capacity(&self) -> usize {
        self.exit_unqualified_threshold.saturating_add(1)
    }

    /// Check that every value is usable.
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        fn non_negative(name: &str, value: f64) -> Result<(), String> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(format!("{} must be a non-negative number, got {}", name, value))
            }
        }

        non_negative(
            "minimum_speed_at_entrance_mps",
            self.minimum_speed_at_entrance_mps,
        )?;
        non_negative(
            "minimum_distance_to_entrance_m",
            self.minimum_distance_to_entrance_m,
        )?;
        non_negative(
            "max_horizontal_accuracy_m",
            self.qualification.max_horizontal_accuracy_m,
        )?;
        non_negative("default_speed_mps", self.simulation.default_speed_mps)?;
        non_negative("min_speed_mps", self.simulation.min_speed_mps)?;
        non_negative("max_speed_mps", self.simulation.max_speed_mps)?;
        non_negative(
            "horizontal_accuracy_m",
            self.simulation.horizontal_accuracy_m,
        )?;

        if self.exit_unqualified_threshold > MAX_EXIT_UNQUALIFIED_THRESHOLD {
            return Err(format!(
                "exit_unqualified_threshold must be at most {}, got {}",
                MAX_EXIT_UNQUALIFIED_THRESHOLD, self.exit_unqualified_threshold
            ));
        }
        if self.simulation.min_speed_mps > self.simulation.max_speed_mps {
            return Err(format!(
                "min_speed_mps ({}) exceeds max_speed_mps ({})",
                self.simulation.min_speed_mps, self.simulation.max_speed_mps
            ));
        }
        if !(self.simulation.time_scale.is_finite() && self.simulation.time_scale > 0.0) {
            return Err(format!(
                "time_scale must be positive, got {}",
                self.simulation.time_scale
            ));
        }
        if self.simulation.tick_interval.is_zero() {
            return Err("tick_interval must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TunnelConfig::default();
        assert_eq!(config.minimum_speed_at_entrance_mps, 5.0);
        assert_eq!(config.minimum_distance_to_entrance_m, 50.0);
        assert_eq!(config.exit_unqualified_threshold, 3);
        assert_eq!(config.exit_buffer_capacity(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = TunnelConfig::default()
            .with_minimum_speed_at_entrance(8.0)
            .with_minimum_distance_to_entrance(120.0)
            .with_exit_unqualified_threshold(5)
            .with_notification_timeout(Duration::from_millis(250));

        assert_eq!(config.minimum_speed_at_entrance_mps, 8.0);
        assert_eq!(config.minimum_distance_to_entrance_m, 120.0);
        assert_eq!(config.exit_buffer_capacity(), 6);
        assert_eq!(config.notification_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_negative_radius() {
        let config = TunnelConfig::default().with_minimum_distance_to_entrance(-1.0);
        let err = config.validate().unwrap_err();
        assert!(err.contains("minimum_distance_to_entrance_m"));
    }

    #[test]
    fn test_validate_bounds_exit_threshold() {
        let at_limit = TunnelConfig::default()
            .with_exit_unqualified_threshold(MAX_EXIT_UNQUALIFIED_THRESHOLD);
        assert!(at_limit.validate().is_ok());

        let over = TunnelConfig::default().with_exit_unqualified_threshold(usize::MAX);
        assert!(over
            .validate()
            .unwrap_err()
            .contains("exit_unqualified_threshold"));
        assert_eq!(over.exit_buffer_capacity(), usize::MAX);
    }

    #[test]
    fn test_validate_rejects_inverted_speed_clamp() {
        let config = TunnelConfig::default().with_simulation(SimulationConfig {
            min_speed_mps: 30.0,
            max_speed_mps: 10.0,
            ..Default::default()
        });
        assert!(config.validate().unwrap_err().contains("min_speed_mps"));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = TunnelConfig::default().with_simulation(SimulationConfig {
            tick_interval: Duration::ZERO,
            ..Default::default()
        });
        assert!(config.validate().unwrap_err().contains("tick_interval"));
    }
}
