//! Location samples, their sources, and quality classification.
//!
//! A [`LocationSample`] is immutable once produced. Whether it can be trusted
//! is not stored on the sample itself but decided by a [`LocationQualifier`],
//! so hosts can plug in their own accuracy/recency heuristics.

mod qualifier;
mod source;

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::route::Coordinate;

pub use qualifier::{
    AccuracyQualifier, LocationQualifier, QualificationConfig, DEFAULT_MAX_HORIZONTAL_ACCURACY_M,
    DEFAULT_MAX_SAMPLE_AGE,
};
pub use source::{ready, BoxFuture, LocationSource};

/// Which kind of source produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The platform's real GPS/location service.
    Platform,
    /// The synthetic feed walking the route.
    Simulated,
}

impl SourceKind {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Platform => "platform",
            SourceKind::Simulated => "simulated",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single location fix.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSample {
    /// Position.
    pub coordinate: Coordinate,
    /// Speed in m/s. Negative means unknown.
    pub speed_mps: f64,
    /// Course over ground in degrees. Negative means unknown.
    pub course_deg: f64,
    /// Horizontal accuracy radius in meters. Negative means invalid.
    pub horizontal_accuracy_m: f64,
    /// When the fix was produced.
    pub timestamp: Instant,
    /// Which source produced the fix.
    pub source: SourceKind,
}

impl LocationSample {
    /// Create a sample timestamped now.
    pub fn new(
        coordinate: Coordinate,
        speed_mps: f64,
        course_deg: f64,
        horizontal_accuracy_m: f64,
        source: SourceKind,
    ) -> Self {
        Self::with_timestamp(
            coordinate,
            speed_mps,
            course_deg,
            horizontal_accuracy_m,
            source,
            Instant::now(),
        )
    }

    /// Create a sample with an explicit timestamp.
    pub fn with_timestamp(
        coordinate: Coordinate,
        speed_mps: f64,
        course_deg: f64,
        horizontal_accuracy_m: f64,
        source: SourceKind,
        timestamp: Instant,
    ) -> Self {
        Self {
            coordinate,
            speed_mps,
            course_deg,
            horizontal_accuracy_m,
            timestamp,
            source,
        }
    }

    /// Whether the speed reading is usable.
    pub fn has_valid_speed(&self) -> bool {
        self.speed_mps.is_finite() && self.speed_mps >= 0.0
    }

    /// Whether the accuracy reading is usable.
    pub fn has_valid_accuracy(&self) -> bool {
        self.horizontal_accuracy_m.is_finite() && self.horizontal_accuracy_m >= 0.0
    }

    /// Time elapsed since the fix was produced.
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

impl fmt::Display for LocationSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {:.1} m/s, ±{:.0}m)",
            self.coordinate, self.source, self.speed_mps, self.horizontal_accuracy_m
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::Platform.to_string(), "platform");
        assert_eq!(SourceKind::Simulated.to_string(), "simulated");
    }

    #[test]
    fn test_invalid_readings() {
        let sample = LocationSample::new(
            Coordinate::new(0.0, 0.0),
            -1.0,
            -1.0,
            -1.0,
            SourceKind::Platform,
        );
        assert!(!sample.has_valid_speed());
        assert!(!sample.has_valid_accuracy());
    }

    #[test]
    fn test_valid_readings() {
        let sample = LocationSample::new(
            Coordinate::new(0.0, 0.0),
            12.0,
            90.0,
            8.0,
            SourceKind::Simulated,
        );
        assert!(sample.has_valid_speed());
        assert!(sample.has_valid_accuracy());
        assert!(sample.to_string().contains("simulated"));
    }
}
