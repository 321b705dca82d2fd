//! Location quality classification.
//!
//! A sample is "qualified" when it is trustworthy enough to drive
//! navigation. The tunnel logic only ever asks the yes/no question through
//! the [`LocationQualifier`] trait; the default [`AccuracyQualifier`] answers
//! it from horizontal accuracy and sample age.

use std::time::Duration;

use super::LocationSample;

/// Default maximum horizontal accuracy radius for a qualified sample (meters).
pub const DEFAULT_MAX_HORIZONTAL_ACCURACY_M: f64 = 100.0;

/// Default maximum age of a qualified sample.
pub const DEFAULT_MAX_SAMPLE_AGE: Duration = Duration::from_secs(10);

/// Decides whether a location sample can be trusted.
///
/// Implementations must be cheap and side-effect free; the detector calls
/// them on every update.
pub trait LocationQualifier: Send + Sync {
    /// Returns `true` if the sample is trustworthy.
    fn is_qualified(&self, sample: &LocationSample) -> bool;
}

/// Thresholds for [`AccuracyQualifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct QualificationConfig {
    /// Samples with a larger accuracy radius are unqualified.
    pub max_horizontal_accuracy_m: f64,
    /// Samples older than this are unqualified.
    pub max_age: Duration,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            max_horizontal_accuracy_m: DEFAULT_MAX_HORIZONTAL_ACCURACY_M,
            max_age: DEFAULT_MAX_SAMPLE_AGE,
        }
    }
}

/// Qualifies samples by accuracy radius and recency.
#[derive(Debug, Clone, Default)]
pub struct AccuracyQualifier {
    config: QualificationConfig,
}

impl AccuracyQualifier {
    /// Create a qualifier with the given thresholds.
    pub fn new(config: QualificationConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &QualificationConfig {
        &self.config
    }
}

impl LocationQualifier for AccuracyQualifier {
    fn is_qualified(&self, sample: &LocationSample) -> bool {
        sample.has_valid_accuracy()
            && sample.horizontal_accuracy_m <= self.config.max_horizontal_accuracy_m
            && sample.age() <= self.config.max_age
    }
}
