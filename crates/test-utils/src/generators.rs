//! Synthetic multi-band scenes.
//!
//! A [`Scene`] is a flat list of pixels per band. Values are `None` where the
//! pixel is masked (cloud, outside coverage). Generators pick band values so
//! that derived indices come out at the requested value:
//! with NIR fixed at 0.5, `RED = 0.5 * (1 - ndvi) / (1 + ndvi)` gives
//! `(NIR - RED) / (NIR + RED) = ndvi`, and likewise SWIR1 for NDMI.

use std::collections::HashMap;

use imagery::bands;

const NIR_REFLECTANCE: f64 = 0.5;

/// Pixel values per band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pixels: usize,
    bands: HashMap<String, Vec<Option<f64>>>,
}

fn counterpart_for_index(index: f64) -> f64 {
    NIR_REFLECTANCE * (1.0 - index) / (1.0 + index)
}

impl Scene {
    /// Empty scene with `pixels` pixels and no bands.
    pub fn new(pixels: usize) -> Self {
        Self {
            pixels,
            bands: HashMap::new(),
        }
    }

    /// Add or replace a band. Panics if the length does not match.
    pub fn with_band(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        assert_eq!(values.len(), self.pixels, "band {} has wrong length", name);
        self.bands.insert(name.to_string(), values);
        self
    }

    /// Scene whose NDVI and NDMI equal the given per-pixel values.
    pub fn with_indices(ndvi: &[f64], ndmi: &[f64]) -> Self {
        assert_eq!(ndvi.len(), ndmi.len(), "index slices differ in length");
        let pixels = ndvi.len();
        Self::new(pixels)
            .with_band(bands::NIR, vec![Some(NIR_REFLECTANCE); pixels])
            .with_band(
                bands::RED,
                ndvi.iter().map(|v| Some(counterpart_for_index(*v))).collect(),
            )
            .with_band(
                bands::SWIR1,
                ndmi.iter().map(|v| Some(counterpart_for_index(*v))).collect(),
            )
    }

    /// Scene with per-pixel NDVI and a neutral NDMI of 0.5.
    pub fn with_ndvi(ndvi: &[f64]) -> Self {
        Self::with_indices(ndvi, &vec![0.5; ndvi.len()])
    }

    /// Scene with per-pixel NDMI and a neutral NDVI of 0.5.
    pub fn with_ndmi(ndmi: &[f64]) -> Self {
        Self::with_indices(&vec![0.5; ndmi.len()], ndmi)
    }

    /// `pixels` pixels all at the same NDVI and NDMI.
    pub fn uniform(pixels: usize, ndvi: f64, ndmi: f64) -> Self {
        Self::with_indices(&vec![ndvi; pixels], &vec![ndmi; pixels])
    }

    /// Scene where every pixel of every band is masked.
    pub fn fully_masked(pixels: usize) -> Self {
        let mut scene = Self::new(pixels);
        for band in bands::COMPOSITE {
            scene = scene.with_band(band, vec![None; pixels]);
        }
        scene
    }

    /// Scene where NIR and RED are both zero, so NDVI is undefined everywhere.
    pub fn zero_reflectance(pixels: usize) -> Self {
        Self::new(pixels)
            .with_band(bands::NIR, vec![Some(0.0); pixels])
            .with_band(bands::RED, vec![Some(0.0); pixels])
            .with_band(bands::SWIR1, vec![Some(0.0); pixels])
    }

    pub fn pixels(&self) -> usize {
        self.pixels
    }

    pub fn band(&self, name: &str) -> Option<&Vec<Option<f64>>> {
        self.bands.get(name)
    }
}

/// `n` values where the first `k` are `low` and the rest `high`.
pub fn split_values(n: usize, k: usize, low: f64, high: f64) -> Vec<f64> {
    (0..n).map(|i| if i < k { low } else { high }).collect()
}
