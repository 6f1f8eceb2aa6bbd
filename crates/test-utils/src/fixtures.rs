//! Common test fixtures.

use chrono::NaiveDate;
use field_common::{AnalysisPeriod, FieldGeometry};

/// A small closed square near Pune: five points, first equals last.
pub fn square_field() -> FieldGeometry {
    FieldGeometry::from_ring(vec![
        (73.80, 18.50),
        (73.81, 18.50),
        (73.81, 18.51),
        (73.80, 18.51),
        (73.80, 18.50),
    ])
    .expect("square field is a valid ring")
}

/// The square as a JSON `coordinates` value (array of rings).
pub fn square_field_json() -> serde_json::Value {
    serde_json::json!([[
        [73.80, 18.50],
        [73.81, 18.50],
        [73.81, 18.51],
        [73.80, 18.51],
        [73.80, 18.50]
    ]])
}

/// Parse a `YYYY-MM-DD` date.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("fixture date")
}

/// Period between two `YYYY-MM-DD` dates.
pub fn period(start: &str, end: &str) -> AnalysisPeriod {
    AnalysisPeriod::new(date(start), date(end)).expect("fixture period")
}
