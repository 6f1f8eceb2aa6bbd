//! Common types shared across the field analytics crates and services.

pub mod error;
pub mod geometry;
pub mod layer;
pub mod period;

pub use error::{FieldError, FieldResult};
pub use geometry::{Coordinate, FieldGeometry, PolygonCoordinates};
pub use layer::MapLayer;
pub use period::{AnalysisPeriod, DATE_FORMAT};
