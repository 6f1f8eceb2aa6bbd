//! Vegetation Index Engine.
//!
//! Wires normalized-difference formulas onto provider images. The engine
//! only chooses bands and names the output; the arithmetic runs on the
//! provider. No clamping is applied: where `a + b == 0` the pixel is
//! undefined and reducers skip it.

use serde::{Deserialize, Serialize};

use crate::image::Image;

/// Sentinel-2 surface reflectance band names.
pub mod bands {
    pub const BLUE: &str = "B2";
    pub const GREEN: &str = "B3";
    pub const RED: &str = "B4";
    pub const NIR: &str = "B8";
    pub const SWIR1: &str = "B11";
    pub const SWIR2: &str = "B12";

    /// Bands kept in every composite.
    pub const COMPOSITE: [&str; 6] = [BLUE, GREEN, RED, NIR, SWIR1, SWIR2];
}

/// Supported derived indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VegetationIndex {
    /// Normalized Difference Vegetation Index: (NIR - RED) / (NIR + RED).
    Ndvi,
    /// Normalized Difference Moisture Index: (NIR - SWIR1) / (NIR + SWIR1).
    Ndmi,
}

impl VegetationIndex {
    /// Output band name.
    pub fn band_name(&self) -> &'static str {
        match self {
            VegetationIndex::Ndvi => "NDVI",
            VegetationIndex::Ndmi => "NDMI",
        }
    }

    /// (positive, negative) bands of the normalized difference.
    pub fn bands(&self) -> (&'static str, &'static str) {
        match self {
            VegetationIndex::Ndvi => (bands::NIR, bands::RED),
            VegetationIndex::Ndmi => (bands::NIR, bands::SWIR1),
        }
    }

    /// Derive this index from a multi-band image.
    pub fn compute(&self, image: &Image) -> Image {
        let (a, b) = self.bands();
        image.normalized_difference(a, b).rename(self.band_name())
    }
}

/// NDVI band derived from a composite or capture.
pub fn compute_ndvi(image: &Image) -> Image {
    VegetationIndex::Ndvi.compute(image)
}

/// NDMI band derived from a composite or capture.
pub fn compute_ndmi(image: &Image) -> Image {
    VegetationIndex::Ndmi.compute(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ArithmeticOp, ImageExpr};

    fn selected_bands(expr: &ImageExpr, out: &mut Vec<String>) {
        match expr {
            ImageExpr::Select { band, .. } => out.push(band.clone()),
            ImageExpr::Arithmetic { lhs, rhs, .. } | ImageExpr::And { lhs, rhs } => {
                selected_bands(lhs, out);
                selected_bands(rhs, out);
            }
            ImageExpr::Compare { input, .. }
            | ImageExpr::Rename { input, .. }
            | ImageExpr::Clip { input, .. } => selected_bands(input, out),
            ImageExpr::Source { .. } => {}
        }
    }

    #[test]
    fn test_ndvi_uses_nir_and_red() {
        let ndvi = compute_ndvi(&Image::source("c"));
        assert_eq!(ndvi.band_name(), Some("NDVI"));

        let mut used = Vec::new();
        selected_bands(ndvi.expr(), &mut used);
        used.sort();
        used.dedup();
        assert_eq!(used, vec!["B4".to_string(), "B8".to_string()]);
    }

    #[test]
    fn test_ndmi_uses_nir_and_swir1() {
        let ndmi = compute_ndmi(&Image::source("c"));
        assert_eq!(ndmi.band_name(), Some("NDMI"));

        let mut used = Vec::new();
        selected_bands(ndmi.expr(), &mut used);
        used.sort();
        used.dedup();
        assert_eq!(used, vec!["B11".to_string(), "B8".to_string()]);
    }

    #[test]
    fn test_index_is_a_ratio() {
        let ndvi = compute_ndvi(&Image::source("c"));
        let ImageExpr::Rename { input, .. } = ndvi.expr() else {
            panic!("expected rename at root");
        };
        assert!(matches!(
            input.as_ref(),
            ImageExpr::Arithmetic {
                arith: ArithmeticOp::Divide,
                ..
            }
        ));
    }
}
