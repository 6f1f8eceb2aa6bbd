//! Field polygon geometry.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// Minimum number of points in a closed ring (a triangle plus the closing point).
pub const MIN_RING_POINTS: usize = 4;

/// A (longitude, latitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A field boundary as a closed ring of (longitude, latitude) pairs.
///
/// The ring is validated on construction and never mutated afterwards:
/// at least four points, first and last point equal, all coordinates finite
/// and within geographic range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct FieldGeometry {
    ring: Vec<Coordinate>,
}

impl FieldGeometry {
    /// Build a geometry from a closed ring of `(lon, lat)` pairs.
    pub fn from_ring(points: Vec<(f64, f64)>) -> FieldResult<Self> {
        let ring: Vec<Coordinate> = points
            .into_iter()
            .map(|(lon, lat)| Coordinate::new(lon, lat))
            .collect();
        Self::validate(&ring)?;
        Ok(Self { ring })
    }

    fn validate(ring: &[Coordinate]) -> FieldResult<()> {
        if ring.len() < MIN_RING_POINTS {
            return Err(FieldError::InvalidGeometry(format!(
                "polygon needs at least {} points, got {}",
                MIN_RING_POINTS,
                ring.len()
            )));
        }

        for (i, c) in ring.iter().enumerate() {
            if !c.lon.is_finite() || !c.lat.is_finite() {
                return Err(FieldError::InvalidGeometry(format!(
                    "point {} is not a finite coordinate",
                    i
                )));
            }
            if !(-180.0..=180.0).contains(&c.lon) || !(-90.0..=90.0).contains(&c.lat) {
                return Err(FieldError::InvalidGeometry(format!(
                    "point {} ({}, {}) is outside longitude/latitude range",
                    i, c.lon, c.lat
                )));
            }
        }

        // Checked above: ring has at least MIN_RING_POINTS entries.
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if first != last {
            return Err(FieldError::InvalidGeometry(
                "ring is not closed: first and last points differ".to_string(),
            ));
        }

        Ok(())
    }

    /// Points of the ring, closing point included.
    pub fn points(&self) -> &[Coordinate] {
        &self.ring
    }

    /// Number of points in the ring, closing point included.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Bounding box as (min_lon, min_lat, max_lon, max_lat).
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.ring.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(min_x, min_y, max_x, max_y), c| {
                (
                    min_x.min(c.lon),
                    min_y.min(c.lat),
                    max_x.max(c.lon),
                    max_y.max(c.lat),
                )
            },
        )
    }

    /// Ring as GeoJSON-style `[[lon, lat], ...]` pairs.
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.ring.iter().map(|c| [c.lon, c.lat]).collect()
    }
}

impl TryFrom<Vec<[f64; 2]>> for FieldGeometry {
    type Error = FieldError;

    fn try_from(pairs: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Self::from_ring(pairs.into_iter().map(|[lon, lat]| (lon, lat)).collect())
    }
}

impl From<FieldGeometry> for Vec<[f64; 2]> {
    fn from(geometry: FieldGeometry) -> Self {
        geometry.to_pairs()
    }
}

/// Polygon coordinates as they arrive in a request body.
///
/// Accepts either a polygon (`[[[lon, lat], ...]]`, exterior ring first) or a
/// bare ring (`[[lon, lat], ...]`). Interior rings are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PolygonCoordinates {
    Polygon(Vec<Vec<[f64; 2]>>),
    Ring(Vec<[f64; 2]>),
}

impl PolygonCoordinates {
    /// Validate into a [`FieldGeometry`] using the exterior ring.
    pub fn into_geometry(self) -> FieldResult<FieldGeometry> {
        let ring = match self {
            PolygonCoordinates::Polygon(rings) => rings.into_iter().next().ok_or_else(|| {
                FieldError::InvalidGeometry("polygon has no rings".to_string())
            })?,
            PolygonCoordinates::Ring(ring) => ring,
        };
        FieldGeometry::try_from(ring)
    }
}
