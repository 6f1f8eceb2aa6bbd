//! Region reductions shared by the classifiers.
//!
//! Every percentage in the engine goes through [`safe_percent`], so a region
//! without valid pixels yields 0 instead of a division by zero.

use field_common::FieldGeometry;
use imagery::{Image, ImageProvider, ReduceParams, Reducer, RegionStatistics};
use serde::{Deserialize, Serialize};

/// `numerator / denominator`, or 0 when the denominator is zero or not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// [`safe_ratio`] scaled to a percentage.
///
/// Scales before dividing so whole-pixel counts give exact percentages.
pub fn safe_percent(numerator: f64, denominator: f64) -> f64 {
    safe_ratio(numerator * 100.0, denominator)
}

/// Share of valid pixels selected by a 0/1 mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaShare {
    pub selected_pixels: f64,
    pub total_pixels: f64,
}

impl AreaShare {
    pub fn percent(&self) -> f64 {
        safe_percent(self.selected_pixels, self.total_pixels)
    }

    pub fn has_valid_pixels(&self) -> bool {
        self.total_pixels > 0.0
    }
}

/// Count of valid pixels in `image` over the geometry.
pub async fn pixel_count(
    provider: &dyn ImageProvider,
    image: &Image,
    geometry: &FieldGeometry,
) -> imagery::Result<f64> {
    let values = provider
        .reduce_region(image, geometry, &[Reducer::Count], ReduceParams::index())
        .await?;
    Ok(values.get(Reducer::Count).unwrap_or(0.0))
}

/// Number of pixels where `mask` is 1.
pub async fn mask_sum(
    provider: &dyn ImageProvider,
    mask: &Image,
    geometry: &FieldGeometry,
) -> imagery::Result<f64> {
    let values = provider
        .reduce_region(mask, geometry, &[Reducer::Sum], ReduceParams::index())
        .await?;
    Ok(values.get(Reducer::Sum).unwrap_or(0.0))
}

/// Sum of `mask` against the valid-pixel count of `base`.
pub async fn area_share(
    provider: &dyn ImageProvider,
    base: &Image,
    mask: &Image,
    geometry: &FieldGeometry,
) -> imagery::Result<AreaShare> {
    let total_pixels = pixel_count(provider, base, geometry).await?;
    let selected_pixels = mask_sum(provider, mask, geometry).await?;
    Ok(AreaShare {
        selected_pixels,
        total_pixels,
    })
}

/// Reduce `image` with the given reducers at index resolution.
pub async fn region_statistics(
    provider: &dyn ImageProvider,
    image: &Image,
    geometry: &FieldGeometry,
    reducers: &[Reducer],
) -> imagery::Result<RegionStatistics> {
    let values = provider
        .reduce_region(image, geometry, reducers, ReduceParams::index())
        .await?;
    Ok(RegionStatistics::from(&values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ratio_zero_denominator() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(5.0, f64::NAN), 0.0);
        assert_eq!(safe_ratio(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_safe_percent() {
        assert_eq!(safe_percent(45.0, 100.0), 45.0);
        assert_eq!(safe_percent(0.0, 0.0), 0.0);
        assert_eq!(safe_percent(3.0, 10.0), 30.0);
    }

    #[test]
    fn test_area_share() {
        let share = AreaShare {
            selected_pixels: 3.0,
            total_pixels: 4.0,
        };
        assert_eq!(share.percent(), 75.0);
        assert!(share.has_valid_pixels());
        assert!(!AreaShare::default().has_valid_pixels());
        assert_eq!(AreaShare::default().percent(), 0.0);
    }
}
