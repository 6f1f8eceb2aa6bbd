//! Landing page handler.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LandingPage {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<Endpoint>,
    pub example_coordinates: Vec<Vec<[f64; 2]>>,
    pub note: &'static str,
}

const ENDPOINTS: [(&str, &str, &str, &str); 11] = [
    ("health", "GET", "/api/health", "Service health and map cache statistics"),
    ("yield_prediction", "POST", "/api/yield-prediction", "Analyze field productivity zones"),
    ("water_stress", "POST", "/api/water-stress", "Detect water stress areas"),
    ("crop_growth", "POST", "/api/crop-growth", "Track crop growth over time"),
    ("disease_alert", "POST", "/api/disease-alert", "Detect disease and pest risks"),
    ("historical_comparison", "POST", "/api/historical-comparison", "Compare with past seasons"),
    ("full_analysis", "POST", "/api/full-analysis", "Comprehensive field analysis"),
    ("ai_assistant", "POST", "/api/ai-assistant", "Get AI recommendations"),
    ("maps", "POST", "/api/maps/:layer", "Tile URL for ndvi, moisture, productivity or anomaly"),
    ("landing", "GET", "/", "This page"),
    ("metrics", "GET", "/metrics", "Prometheus metrics"),
];

impl LandingPage {
    pub fn new() -> Self {
        Self {
            service: "Field vegetation analytics",
            version: env!("CARGO_PKG_VERSION"),
            description: "Satellite-derived vegetation insights and recommendations for farm fields",
            endpoints: ENDPOINTS
                .iter()
                .map(|&(name, method, path, description)| Endpoint {
                    name,
                    method,
                    path,
                    description,
                })
                .collect(),
            example_coordinates: vec![vec![
                [-122.4194, 37.7749],
                [-122.4094, 37.7749],
                [-122.4094, 37.7649],
                [-122.4194, 37.7649],
                [-122.4194, 37.7749],
            ]],
            note: "Coordinates are [longitude, latitude] pairs forming a closed polygon",
        }
    }
}

impl Default for LandingPage {
    fn default() -> Self {
        Self::new()
    }
}

/// GET / - Service description
pub async fn landing_handler() -> Json<LandingPage> {
    Json(LandingPage::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_common::PolygonCoordinates;

    #[test]
    fn test_example_coordinates_are_valid() {
        let landing = LandingPage::new();
        let coordinates = PolygonCoordinates::Polygon(landing.example_coordinates);
        assert!(coordinates.into_geometry().is_ok());
    }

    #[test]
    fn test_lists_every_analysis_endpoint() {
        let landing = LandingPage::new();
        for path in [
            "/api/yield-prediction",
            "/api/water-stress",
            "/api/crop-growth",
            "/api/disease-alert",
            "/api/historical-comparison",
            "/api/full-analysis",
            "/api/ai-assistant",
        ] {
            assert!(landing.endpoints.iter().any(|e| e.path == path), "{path}");
        }
    }
}
