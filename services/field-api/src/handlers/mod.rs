//! HTTP request handlers for the field API.

pub mod analysis;
pub mod assistant;
pub mod health;
pub mod landing;
pub mod maps;

use chrono::NaiveDate;
use field_common::{FieldError, FieldGeometry, PolygonCoordinates};

/// Date that default analysis windows end on.
pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Validate request coordinates into a geometry.
pub(crate) fn require_geometry(
    coordinates: Option<PolygonCoordinates>,
) -> Result<FieldGeometry, FieldError> {
    coordinates
        .ok_or_else(|| FieldError::MissingParameter("coordinates".to_string()))?
        .into_geometry()
}
