//! Animation state and status snapshots.

use std::fmt;

use serde::Serialize;

use super::metrics::MetricsSnapshot;

/// Whether the simulated feed is driving navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    /// Platform GPS drives navigation.
    #[default]
    Disabled,
    /// The simulated source drives navigation.
    Enabled,
}

impl AnimationState {
    /// Whether animation is enabled.
    pub fn is_enabled(&self) -> bool {
        matches!(self, AnimationState::Enabled)
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationState::Disabled => write!(f, "disabled"),
            AnimationState::Enabled => write!(f, "enabled"),
        }
    }
}

/// Snapshot of the manager for logging and display.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerStatus {
    /// Current animation state.
    pub state: AnimationState,
    /// Unqualified samples waiting in the exit buffer.
    pub buffered_exit_samples: usize,
    /// Whether a simulated source is currently owned.
    pub has_simulated_source: bool,
    /// Distance the simulated source has covered along the route, if any.
    pub simulated_distance_m: Option<f64>,
    /// Counter values.
    pub metrics: MetricsSnapshot,
}
