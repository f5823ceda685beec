use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometres spanned by one degree of latitude.
const KM_PER_DEGREE_LAT: f64 = 110.574;

/// Kilometres spanned by one degree of longitude at the equator.
const KM_PER_DEGREE_LON: f64 = 111.320;

/// Number of segments used when approximating the selection circle.
pub const SELECTION_CIRCLE_SEGMENTS: usize = 64;

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar Euclidean distance in degrees.
    ///
    /// This is the edge-cost metric of the search graph. No projection
    /// correction is applied; at city scale the distortion is uniform enough
    /// that relative costs stay meaningful.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.lon - other.lon).hypot(self.lat - other.lat)
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }

    fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidCoordinate {
            input: s.to_string(),
        };

        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

        let coord = Coordinate::new(lat, lon);
        if !coord.is_valid() {
            return Err(invalid());
        }
        Ok(coord)
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box enclosing a circle of `radius_km` around `center`.
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let (dlat, dlon) = degree_offsets(center, radius_km);
        Self {
            min_lat: center.lat - dlat,
            min_lon: center.lon - dlon,
            max_lat: center.lat + dlat,
            max_lon: center.lon + dlon,
        }
    }

    /// Smallest box enclosing every point of a polygon ring.
    pub fn from_ring(ring: &[Coordinate]) -> Option<Self> {
        let first = ring.first()?;
        let mut bbox = Self {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };
        for point in &ring[1..] {
            bbox.min_lat = bbox.min_lat.min(point.lat);
            bbox.min_lon = bbox.min_lon.min(point.lon);
            bbox.max_lat = bbox.max_lat.max(point.lat);
            bbox.max_lon = bbox.max_lon.max(point.lon);
        }
        Some(bbox)
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

/// Closed polygon ring approximating the selection circle around `center`.
///
/// The first point is repeated at the end so hosts can feed the ring straight
/// into a polygon layer.
pub fn selection_circle(center: Coordinate, radius_km: f64, segments: usize) -> Vec<Coordinate> {
    let segments = segments.max(3);
    let (dlat, dlon) = degree_offsets(center, radius_km);

    let mut ring: Vec<Coordinate> = (0..segments)
        .map(|i| {
            let theta = (i as f64 / segments as f64) * 2.0 * PI;
            Coordinate::new(center.lat + dlat * theta.sin(), center.lon + dlon * theta.cos())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

fn degree_offsets(center: Coordinate, radius_km: f64) -> (f64, f64) {
    let dlat = radius_km / KM_PER_DEGREE_LAT;
    let cos_lat = center.lat.to_radians().cos().abs().max(f64::EPSILON);
    let dlon = radius_km / (KM_PER_DEGREE_LON * cos_lat);
    (dlat, dlon)
}
