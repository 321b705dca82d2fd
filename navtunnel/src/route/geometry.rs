//! Route geometry: coordinates, great-circle helpers and polylines.
//!
//! Distances are in meters and bearings in degrees (0-360, 0 = North,
//! 90 = East). The polyline keeps cumulative distances so that positions
//! along the route can be looked up by distance traveled, which is how the
//! simulated location source walks the route.

use std::fmt;

use super::RouteError;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Initial bearing towards `other` in degrees (0-360).
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        normalize_bearing(y.atan2(x).to_degrees())
    }

    /// Point reached by travelling `distance_m` from here along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> Coordinate {
        let angular = distance_m / EARTH_RADIUS_M;
        let bearing = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();

        let lat2 =
            (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        Coordinate::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}°, {:.6}°", self.latitude, self.longitude)
    }
}

fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing % 360.0;
    if b < 0.0 {
        b + 360.0
    } else {
        b
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    (lon + 540.0) % 360.0 - 180.0
}

/// A route polyline with cumulative distances.
#[derive(Debug, Clone)]
pub struct RouteGeometry {
    coordinates: Vec<Coordinate>,
    /// `cumulative[i]` is the distance from the first vertex to vertex `i`.
    cumulative: Vec<f64>,
}

impl RouteGeometry {
    /// Build a geometry from at least two valid coordinates.
    pub fn new(coordinates: Vec<Coordinate>) -> Result<Self, RouteError> {
        if coordinates.len() < 2 {
            return Err(RouteError::TooFewCoordinates(coordinates.len()));
        }
        if let Some(index) = coordinates.iter().position(|c| !c.is_valid()) {
            return Err(RouteError::InvalidCoordinate { index });
        }

        let mut cumulative = Vec::with_capacity(coordinates.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in coordinates.windows(2) {
            total += pair[0].distance_to(&pair[1]);
            cumulative.push(total);
        }

        Ok(Self {
            coordinates,
            cumulative,
        })
    }

    /// Straight two-vertex geometry from `start` along `bearing_deg`.
    pub fn straight(start: Coordinate, bearing_deg: f64, length_m: f64) -> Result<Self, RouteError> {
        Self::new(vec![start, start.destination(bearing_deg, length_m)])
    }

    /// Total length in meters.
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// The polyline vertices.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Position at `distance_m` along the route, clamped to its ends.
    pub fn coordinate_at(&self, distance_m: f64) -> Coordinate {
        let (index, fraction) = self.locate(distance_m);
        let from = self.coordinates[index];
        let Some(to) = self.coordinates.get(index + 1) else {
            return from;
        };

        // Linear interpolation is accurate enough between nearby vertices
        Coordinate::new(
            from.latitude + (to.latitude - from.latitude) * fraction,
            from.longitude + (to.longitude - from.longitude) * fraction,
        )
    }

    /// Course of the segment containing `distance_m`, in degrees.
    pub fn bearing_at(&self, distance_m: f64) -> f64 {
        let (index, _) = self.locate(distance_m);
        let index = index.min(self.coordinates.len() - 2);
        self.coordinates[index].bearing_to(&self.coordinates[index + 1])
    }

    /// Segment index and fraction within it for a distance along the route.
    fn locate(&self, distance_m: f64) -> (usize, f64) {
        let distance = distance_m.clamp(0.0, self.length());
        let last_segment = self.coordinates.len() - 2;

        let index = match self
            .cumulative
            .binary_search_by(|d| d.total_cmp(&distance))
        {
            Ok(i) => i.min(last_segment),
            Err(i) => i.saturating_sub(1).min(last_segment),
        };

        let start = self.cumulative[index];
        let span = self.cumulative[index + 1] - start;
        let fraction = if span > 0.0 {
            ((distance - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (index, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAMBURG: Coordinate = Coordinate::new(53.5511, 9.9937);

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((origin.bearing_to(&Coordinate::new(1.0, 0.0)) - 0.0).abs() < 0.01);
        assert!((origin.bearing_to(&Coordinate::new(0.0, 1.0)) - 90.0).abs() < 0.01);
        assert!((origin.bearing_to(&Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 0.01);
        assert!((origin.bearing_to(&Coordinate::new(0.0, -1.0)) - 270.0).abs() < 0.01);
    }

    #[test]
    fn test_destination_roundtrips_distance_and_bearing() {
        let dest = HAMBURG.destination(90.0, 1_000.0);
        assert!((HAMBURG.distance_to(&dest) - 1_000.0).abs() < 0.5);
        assert!((HAMBURG.bearing_to(&dest) - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_geometry_requires_two_coordinates() {
        let err = RouteGeometry::new(vec![HAMBURG]).unwrap_err();
        assert!(matches!(err, RouteError::TooFewCoordinates(1)));
    }

    #[test]
    fn test_geometry_rejects_invalid_coordinate() {
        let err = RouteGeometry::new(vec![HAMBURG, Coordinate::new(f64::NAN, 0.0)]).unwrap_err();
        assert!(matches!(err, RouteError::InvalidCoordinate { index: 1 }));
    }

    #[test]
    fn test_geometry_length_sums_segments() {
        let b = HAMBURG.destination(0.0, 500.0);
        let c = b.destination(90.0, 300.0);
        let geometry = RouteGeometry::new(vec![HAMBURG, b, c]).unwrap();
        assert!((geometry.length() - 800.0).abs() < 1.0);
    }

    #[test]
    fn test_coordinate_at_interpolates_and_clamps() {
        let geometry = RouteGeometry::straight(HAMBURG, 90.0, 1_000.0).unwrap();

        let mid = geometry.coordinate_at(500.0);
        assert!((HAMBURG.distance_to(&mid) - 500.0).abs() < 1.0);

        assert_eq!(geometry.coordinate_at(-10.0), HAMBURG);
        let end = geometry.coordinates()[1];
        assert!(geometry.coordinate_at(5_000.0).distance_to(&end) < 1e-3);
    }

    #[test]
    fn test_bearing_at_follows_segments() {
        let b = HAMBURG.destination(0.0, 500.0);
        let c = b.destination(90.0, 500.0);
        let geometry = RouteGeometry::new(vec![HAMBURG, b, c]).unwrap();

        assert!(geometry.bearing_at(100.0) < 1.0 || geometry.bearing_at(100.0) > 359.0);
        assert!((geometry.bearing_at(900.0) - 90.0).abs() < 1.0);
        // Past the end keeps the last segment's course
        assert!((geometry.bearing_at(10_000.0) - 90.0).abs() < 1.0);
    }
}
