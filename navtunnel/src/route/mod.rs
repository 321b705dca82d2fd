//! Route model and progress snapshots.
//!
//! The tunnel logic never computes routes. It only reads a [`RouteProgress`]
//! snapshot describing where the user is relative to the intersections of
//! the route being followed. [`Route::progress_at`] is the reference producer
//! of those snapshots, used by the replay driver and the tests.
//!
//! # Progress Model
//!
//! ```text
//!   current            upcoming
//!      │◄── traveled ──►•◄── distance_to_upcoming ──►│
//! ─────●────────────────────────────────────────────●──────► route
//! ```

mod geometry;
mod road_class;

use std::sync::Arc;

use thiserror::Error;

pub use geometry::{Coordinate, RouteGeometry, EARTH_RADIUS_M};
pub use road_class::{RoadClass, RoadClassSet};

/// Errors raised while building a route.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    /// Geometry needs at least two vertices.
    #[error("Route geometry needs at least 2 coordinates, got {0}")]
    TooFewCoordinates(usize),

    /// A vertex is not a finite WGS84 coordinate.
    #[error("Invalid coordinate at index {index}")]
    InvalidCoordinate { index: usize },

    /// Intersections must be ordered by distance along the route.
    #[error("Intersection {index} at {distance:.1}m is out of order")]
    IntersectionOutOfOrder { index: usize, distance: f64 },

    /// Intersection lies outside the route.
    #[error("Intersection {index} at {distance:.1}m is off the route (length {length:.1}m)")]
    IntersectionOffRoute {
        index: usize,
        distance: f64,
        length: f64,
    },
}

/// An intersection as seen from a progress snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Where the intersection is.
    pub location: Coordinate,
    /// Road classes of the segment leaving the intersection, if known.
    pub road_classes: Option<RoadClassSet>,
}

impl Intersection {
    /// Whether the outgoing segment is tagged with `class`.
    ///
    /// Missing road-class data counts as "not tagged".
    pub fn has_road_class(&self, class: RoadClass) -> bool {
        self.road_classes.is_some_and(|set| set.contains(class))
    }
}

/// An intersection placed at a distance along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteIntersection {
    /// Distance from the route origin in meters.
    pub distance_along: f64,
    /// Road classes of the outgoing segment.
    pub road_classes: Option<RoadClassSet>,
}

impl RouteIntersection {
    /// Create an intersection at `distance_along` meters.
    pub fn new(distance_along: f64, road_classes: Option<RoadClassSet>) -> Self {
        Self {
            distance_along,
            road_classes,
        }
    }
}

/// A route: geometry plus the intersections along it.
#[derive(Debug, Clone)]
pub struct Route {
    geometry: RouteGeometry,
    intersections: Vec<RouteIntersection>,
}

impl Route {
    /// Build a route, validating that intersections are ordered and on it.
    pub fn new(
        geometry: RouteGeometry,
        intersections: Vec<RouteIntersection>,
    ) -> Result<Self, RouteError> {
        let length = geometry.length();
        let mut previous = f64::NEG_INFINITY;

        for (index, intersection) in intersections.iter().enumerate() {
            let distance = intersection.distance_along;
            if !distance.is_finite() || distance < 0.0 || distance > length {
                return Err(RouteError::IntersectionOffRoute {
                    index,
                    distance,
                    length,
                });
            }
            if distance < previous {
                return Err(RouteError::IntersectionOutOfOrder { index, distance });
            }
            previous = distance;
        }

        Ok(Self {
            geometry,
            intersections,
        })
    }

    /// The route polyline.
    pub fn geometry(&self) -> &RouteGeometry {
        &self.geometry
    }

    /// Intersections in route order.
    pub fn intersections(&self) -> &[RouteIntersection] {
        &self.intersections
    }

    /// Total route length in meters.
    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    /// Progress snapshot for a user `distance_traveled` meters along the route.
    ///
    /// The current intersection is the last one at or behind the user; the
    /// upcoming intersection is the first one strictly ahead.
    pub fn progress_at(self: &Arc<Self>, distance_traveled: f64) -> RouteProgress {
        let distance = distance_traveled.clamp(0.0, self.length());
        let split = self
            .intersections
            .partition_point(|i| i.distance_along <= distance);

        let current = split
            .checked_sub(1)
            .and_then(|i| self.intersections.get(i))
            .map(|i| self.to_intersection(i));
        let upcoming_entry = self.intersections.get(split);
        let upcoming = upcoming_entry.map(|i| self.to_intersection(i));
        let distance_to_upcoming = upcoming_entry.map(|i| i.distance_along - distance);

        RouteProgress {
            route: Arc::clone(self),
            current_intersection: current,
            upcoming_intersection: upcoming,
            distance_to_upcoming_intersection: distance_to_upcoming,
            distance_traveled: distance,
        }
    }

    fn to_intersection(&self, entry: &RouteIntersection) -> Intersection {
        Intersection {
            location: self.geometry.coordinate_at(entry.distance_along),
            road_classes: entry.road_classes,
        }
    }
}

/// Read-only view of the user's progress along a route.
///
/// Supplied by the host's route tracker on each update.
#[derive(Debug, Clone)]
pub struct RouteProgress {
    /// Route being followed.
    pub route: Arc<Route>,
    /// Intersection the user most recently passed.
    pub current_intersection: Option<Intersection>,
    /// Next intersection ahead of the user.
    pub upcoming_intersection: Option<Intersection>,
    /// Distance to the upcoming intersection in meters.
    pub distance_to_upcoming_intersection: Option<f64>,
    /// Distance traveled from the route origin in meters.
    pub distance_traveled: f64,
}

impl RouteProgress {
    /// Snapshot with no intersection data at all.
    pub fn without_intersections(route: Arc<Route>, distance_traveled: f64) -> Self {
        Self {
            route,
            current_intersection: None,
            upcoming_intersection: None,
            distance_to_upcoming_intersection: None,
            distance_traveled,
        }
    }

    /// Remaining distance to the end of the route in meters.
    pub fn distance_remaining(&self) -> f64 {
        (self.route.length() - self.distance_traveled).max(0.0)
    }
}
