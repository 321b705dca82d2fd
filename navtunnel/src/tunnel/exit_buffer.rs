//! Debounce buffer for leaving tunnel mode.
//!
//! Holds the unqualified samples seen while trying to exit animation. The
//! capacity is enforced on push by evicting the oldest sample, so the
//! buffer never grows past its cap, not even transiently before filtering.

use std::collections::VecDeque;

use crate::location::{LocationQualifier, LocationSample};

/// Capacity-bounded, ordered buffer of recent exit candidates.
#[derive(Debug, Clone)]
pub struct ExitLocationBuffer {
    samples: VecDeque<LocationSample>,
    capacity: usize,
}

impl ExitLocationBuffer {
    /// Create an empty buffer holding at most `capacity` samples.
    ///
    /// A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::new(),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(&mut self, sample: LocationSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Drop every sample the qualifier now accepts.
    pub fn retain_unqualified(&mut self, qualifier: &dyn LocationQualifier) {
        self.samples.retain(|s| !qualifier.is_qualified(s));
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Remove all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Buffered samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LocationSample> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{AccuracyQualifier, SourceKind};
    use crate::route::Coordinate;
    use proptest::prelude::*;

    fn sample(accuracy: f64) -> LocationSample {
        LocationSample::new(
            Coordinate::new(51.5, -0.12),
            12.0,
            180.0,
            accuracy,
            SourceKind::Platform,
        )
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut buffer = ExitLocationBuffer::with_capacity(2);
        buffer.push(sample(201.0));
        buffer.push(sample(202.0));
        buffer.push(sample(203.0));

        assert_eq!(buffer.len(), 2);
        let accuracies: Vec<f64> = buffer.iter().map(|s| s.horizontal_accuracy_m).collect();
        assert_eq!(accuracies, vec![202.0, 203.0]);
    }

    #[test]
    fn test_retain_unqualified_drops_good_fixes() {
        let mut buffer = ExitLocationBuffer::with_capacity(4);
        buffer.push(sample(300.0));
        buffer.push(sample(4.0));
        buffer.push(sample(-1.0));

        buffer.retain_unqualified(&AccuracyQualifier::default());
        assert_eq!(buffer.len(), 2);
        assert!(buffer.iter().all(|s| s.horizontal_accuracy_m != 4.0));
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut buffer = ExitLocationBuffer::with_capacity(0);
        buffer.push(sample(300.0));
        buffer.push(sample(301.0));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_large_capacity_allocates_lazily() {
        let mut buffer = ExitLocationBuffer::with_capacity(usize::MAX);
        assert!(buffer.is_empty());
        buffer.push(sample(300.0));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut buffer = ExitLocationBuffer::with_capacity(4);
        buffer.push(sample(300.0));
        buffer.clear();
        assert!(buffer.is_empty());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(
            capacity in 1usize..8,
            accuracies in proptest::collection::vec(
                prop_oneof![Just(5.0_f64), Just(500.0_f64), Just(-1.0_f64)],
                0..64,
            ),
        ) {
            let qualifier = AccuracyQualifier::default();
            let mut buffer = ExitLocationBuffer::with_capacity(capacity);
            for accuracy in accuracies {
                buffer.push(sample(accuracy));
                prop_assert!(buffer.len() <= capacity);
                buffer.retain_unqualified(&qualifier);
                prop_assert!(buffer.len() <= capacity);
                prop_assert!(buffer.iter().all(|s| !qualifier.is_qualified(s)));
            }
        }
    }
}
