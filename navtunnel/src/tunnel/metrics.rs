//! Counters for tunnel hand-off activity.
//!
//! Lock-free atomic counters recorded by the manager, with a point-in-time
//! [`MetricsSnapshot`] for display.
//!
//! ```text
//! TunnelIntersectionManager ─────► TunnelMetrics ─────► MetricsSnapshot
//!                                  (atomic counters)     (serializable copy)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters shared between the manager and observers.
#[derive(Debug, Default)]
pub struct TunnelMetrics {
    entrances_detected: AtomicU64,
    animations_enabled: AtomicU64,
    animations_disabled: AtomicU64,
    qualified_exits: AtomicU64,
    forced_exits: AtomicU64,
    debounced_samples: AtomicU64,
    teardowns: AtomicU64,
    abandoned_enables: AtomicU64,
}

impl TunnelMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entrance_detected(&self) {
        self.entrances_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn animation_enabled(&self) {
        self.animations_enabled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn animation_disabled(&self, qualified: bool) {
        self.animations_disabled.fetch_add(1, Ordering::Relaxed);
        if qualified {
            self.qualified_exits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.forced_exits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn sample_debounced(&self) {
        self.debounced_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn enable_abandoned(&self) {
        self.abandoned_enables.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entrances_detected: self.entrances_detected.load(Ordering::Relaxed),
            animations_enabled: self.animations_enabled.load(Ordering::Relaxed),
            animations_disabled: self.animations_disabled.load(Ordering::Relaxed),
            qualified_exits: self.qualified_exits.load(Ordering::Relaxed),
            forced_exits: self.forced_exits.load(Ordering::Relaxed),
            debounced_samples: self.debounced_samples.load(Ordering::Relaxed),
            teardowns: self.teardowns.load(Ordering::Relaxed),
            abandoned_enables: self.abandoned_enables.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`TunnelMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Entrance-radius detections.
    pub entrances_detected: u64,
    /// Completed enable transitions.
    pub animations_enabled: u64,
    /// Completed disable transitions.
    pub animations_disabled: u64,
    /// Disables triggered by a qualified fix.
    pub qualified_exits: u64,
    /// Disables triggered by the unqualified-sample threshold.
    pub forced_exits: u64,
    /// Exit samples absorbed by the debounce buffer.
    pub debounced_samples: u64,
    /// Teardown calls.
    pub teardowns: u64,
    /// Enables abandoned because a teardown overtook them.
    pub abandoned_enables: u64,
}
