//! Image provider trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use field_common::{AnalysisPeriod, FieldGeometry};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::Image;
use crate::reducer::{ReduceParams, ReducedValues, Reducer};

/// A single acquisition inside an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// Acquisition date.
    pub date: NaiveDate,
    /// Handle to the full multi-band capture.
    pub image: Image,
}

/// Rendering parameters for a tileable map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationParams {
    pub min: f64,
    pub max: f64,
    /// CSS colour names or hex strings, low to high.
    pub palette: Vec<String>,
}

impl VisualizationParams {
    pub fn new(min: f64, max: f64, palette: &[&str]) -> Self {
        Self {
            min,
            max,
            palette: palette.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Identifier/token pair authorising tile fetches for one rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCredential {
    pub map_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl MapCredential {
    /// Tile URL template: `{base}/{id}/tiles/{z}/{x}/{y}?token={token}`.
    pub fn tile_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        format!(
            "{}/{}/tiles/{{z}}/{{x}}/{{y}}?token={}",
            base,
            self.map_id,
            self.token.as_deref().unwrap_or("")
        )
    }
}

/// Capability exposed by the geospatial compute backend.
///
/// Implementations own all pixel data. Calls block the request until the
/// backend answers; there is no retry layer, a failure is returned as-is.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Cloud-filtered median composite of the fixed band set over the window.
    async fn resolve_image(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<Image>;

    /// Individual cloud-filtered captures over the window, not composited.
    async fn list_captures(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<Vec<Capture>>;

    /// Reduce a single-band image over the geometry.
    async fn reduce_region(
        &self,
        image: &Image,
        geometry: &FieldGeometry,
        reducers: &[Reducer],
        params: ReduceParams,
    ) -> Result<ReducedValues>;

    /// Issue a tile credential for a rendered image.
    async fn issue_map_credential(
        &self,
        image: &Image,
        visualization: &VisualizationParams,
    ) -> Result<MapCredential>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "image-provider"
    }
}
