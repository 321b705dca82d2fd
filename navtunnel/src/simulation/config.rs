//! Configuration for the simulated location feed.

use std::time::Duration;

/// Default interval between simulated samples.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default ratio of simulated time to wall-clock time.
pub const DEFAULT_TIME_SCALE: f64 = 1.0;

/// Default speed when the last platform sample had no usable speed (m/s).
///
/// 13.9 m/s ≈ 50 km/h.
pub const DEFAULT_SIMULATED_SPEED_MPS: f64 = 13.9;

/// Slowest speed the simulation will drive at (m/s).
pub const DEFAULT_MIN_SIMULATED_SPEED_MPS: f64 = 2.0;

/// Fastest speed the simulation will drive at (m/s).
pub const DEFAULT_MAX_SIMULATED_SPEED_MPS: f64 = 40.0;

/// Accuracy radius reported on simulated samples (meters).
pub const DEFAULT_SIMULATED_ACCURACY_M: f64 = 5.0;

/// Configuration for [`SimulatedLocationSource`](super::SimulatedLocationSource).
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Wall-clock interval between emitted samples.
    pub tick_interval: Duration,

    /// Simulated seconds per wall-clock second.
    ///
    /// Values above 1.0 replay a drive faster than real time.
    pub time_scale: f64,

    /// Speed used when no usable platform speed is available.
    pub default_speed_mps: f64,

    /// Lower clamp for the seeded speed.
    pub min_speed_mps: f64,

    /// Upper clamp for the seeded speed.
    pub max_speed_mps: f64,

    /// Accuracy radius stamped on simulated samples.
    pub horizontal_accuracy_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            time_scale: DEFAULT_TIME_SCALE,
            default_speed_mps: DEFAULT_SIMULATED_SPEED_MPS,
            min_speed_mps: DEFAULT_MIN_SIMULATED_SPEED_MPS,
            max_speed_mps: DEFAULT_MAX_SIMULATED_SPEED_MPS,
            horizontal_accuracy_m: DEFAULT_SIMULATED_ACCURACY_M,
        }
    }
}

impl SimulationConfig {
    /// Speed to drive at, given the last observed platform speed.
    ///
    /// Unknown or invalid speeds fall back to `default_speed_mps`; anything
    /// else is clamped to `[min_speed_mps, max_speed_mps]`.
    pub fn seed_speed(&self, observed_mps: Option<f64>) -> f64 {
        match observed_mps {
            Some(speed) if speed.is_finite() && speed >= 0.0 => {
                speed.max(self.min_speed_mps).min(self.max_speed_mps)
            }
            _ => self.default_speed_mps,
        }
    }

    /// Meters advanced per tick at `speed_mps`.
    pub fn step_distance(&self, speed_mps: f64) -> f64 {
        speed_mps * self.tick_interval.as_secs_f64() * self.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.horizontal_accuracy_m, 5.0);
    }

    #[test]
    fn test_seed_speed_clamps() {
        let config = SimulationConfig::default();
        assert_eq!(config.seed_speed(Some(0.5)), 2.0);
        assert_eq!(config.seed_speed(Some(20.0)), 20.0);
        assert_eq!(config.seed_speed(Some(90.0)), 40.0);
    }

    #[test]
    fn test_seed_speed_falls_back_to_default() {
        let config = SimulationConfig::default();
        assert_eq!(config.seed_speed(None), DEFAULT_SIMULATED_SPEED_MPS);
        assert_eq!(config.seed_speed(Some(-1.0)), DEFAULT_SIMULATED_SPEED_MPS);
        assert_eq!(config.seed_speed(Some(f64::NAN)), DEFAULT_SIMULATED_SPEED_MPS);
    }

    #[test]
    fn test_step_distance_scales_with_time() {
        let config = SimulationConfig {
            tick_interval: Duration::from_millis(500),
            time_scale: 4.0,
            ..Default::default()
        };
        assert!((config.step_distance(10.0) - 20.0).abs() < 1e-9);
    }
}
