//! Tunnel entry/exit detection.
//!
//! Pure functions over a location sample and a route progress snapshot.
//! Nothing here mutates state; missing data always yields `false`.
//!
//! # Detection Logic
//!
//! ```text
//! entrance: upcoming ∋ tunnel AND (speed ≥ min_speed OR unqualified)
//!           AND distance_to_upcoming < entrance_radius
//! tunnel:   entrance
//!           OR (current ∋ tunnel AND (!animating OR (platform AND unqualified)))
//! ```
//!
//! The entrance check fires before the vehicle is nominally inside the
//! tunnel segment, so the hand-off can start while GPS is still good. Speed
//! or signal loss is required as well because a stationary, well-located
//! user near a tunnel mouth is not necessarily about to enter it.

use std::sync::Arc;

use crate::location::{LocationQualifier, LocationSample, SourceKind};
use crate::route::{RoadClass, RouteProgress};

use super::config::TunnelConfig;

/// Evaluates tunnel entry against a fixed policy.
#[derive(Clone)]
pub struct TunnelDetector {
    minimum_speed_mps: f64,
    entrance_radius_m: f64,
    qualifier: Arc<dyn LocationQualifier>,
}

impl std::fmt::Debug for TunnelDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelDetector")
            .field("minimum_speed_mps", &self.minimum_speed_mps)
            .field("entrance_radius_m", &self.entrance_radius_m)
            .finish_non_exhaustive()
    }
}

impl TunnelDetector {
    /// Create a detector using the thresholds from `config`.
    pub fn new(config: &TunnelConfig, qualifier: Arc<dyn LocationQualifier>) -> Self {
        Self {
            minimum_speed_mps: config.minimum_speed_at_entrance_mps,
            entrance_radius_m: config.minimum_distance_to_entrance_m,
            qualifier,
        }
    }

    /// The qualifier used for signal-quality checks.
    pub fn qualifier(&self) -> &Arc<dyn LocationQualifier> {
        &self.qualifier
    }

    /// Whether the current intersection is tagged as a tunnel.
    pub fn detects_tunnel_at_current_intersection(&self, progress: &RouteProgress) -> bool {
        progress
            .current_intersection
            .as_ref()
            .is_some_and(|i| i.has_road_class(RoadClass::Tunnel))
    }

    /// Whether the user is about to enter a tunnel.
    pub fn is_within_tunnel_entrance_radius(
        &self,
        location: &LocationSample,
        progress: &RouteProgress,
    ) -> bool {
        let Some(upcoming) = progress.upcoming_intersection.as_ref() else {
            return false;
        };
        if !upcoming.has_road_class(RoadClass::Tunnel) {
            return false;
        }
        let Some(distance) = progress.distance_to_upcoming_intersection else {
            return false;
        };

        let moving = location.has_valid_speed() && location.speed_mps >= self.minimum_speed_mps;
        let unqualified = !self.qualifier.is_qualified(location);

        (moving || unqualified) && distance < self.entrance_radius_m
    }

    /// Composite tunnel verdict.
    ///
    /// `active_source` is the source currently driving navigation and
    /// `animation_enabled` whether the simulated feed is already active.
    pub fn detects_tunnel(
        &self,
        location: &LocationSample,
        active_source: SourceKind,
        animation_enabled: bool,
        progress: &RouteProgress,
    ) -> bool {
        if self.is_within_tunnel_entrance_radius(location, progress) {
            return true;
        }

        if self.detects_tunnel_at_current_intersection(progress) {
            return !animation_enabled
                || (active_source == SourceKind::Platform
                    && !self.qualifier.is_qualified(location));
        }

        false
    }
}
