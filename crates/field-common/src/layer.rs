//! Map layers served as tile credentials.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Analysis type rendered as a tileable map layer.
///
/// Together with a field identifier this keys the map credential cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapLayer {
    /// Vegetation greenness (NDVI).
    Ndvi,
    /// Canopy moisture (NDMI).
    Moisture,
    /// High/medium/low productivity zones.
    Productivity,
    /// NDVI change against the previous 30 days.
    Anomaly,
}

impl MapLayer {
    pub const ALL: [MapLayer; 4] = [
        MapLayer::Ndvi,
        MapLayer::Moisture,
        MapLayer::Productivity,
        MapLayer::Anomaly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapLayer::Ndvi => "ndvi",
            MapLayer::Moisture => "moisture",
            MapLayer::Productivity => "productivity",
            MapLayer::Anomaly => "anomaly",
        }
    }

    /// Human-readable description returned alongside the tile URL.
    pub fn description(&self) -> &'static str {
        match self {
            MapLayer::Ndvi => "NDVI vegetation health map (red = stressed, green = healthy)",
            MapLayer::Moisture => "NDMI moisture map (brown = dry, blue = moist)",
            MapLayer::Productivity => {
                "Productivity zones (red = low, yellow = medium, green = high)"
            }
            MapLayer::Anomaly => {
                "NDVI change versus the previous 30 days (red = decline, green = growth)"
            }
        }
    }
}

impl std::str::FromStr for MapLayer {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ndvi" => Ok(MapLayer::Ndvi),
            "moisture" | "ndmi" | "water-stress" => Ok(MapLayer::Moisture),
            "productivity" | "zones" | "yield" => Ok(MapLayer::Productivity),
            "anomaly" | "disease" => Ok(MapLayer::Anomaly),
            _ => Err(FieldError::UnknownLayer(s.to_string())),
        }
    }
}

impl std::fmt::Display for MapLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
