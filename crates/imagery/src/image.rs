//! Lazy image expressions.
//!
//! An [`Image`] is a handle to a provider-side image. Per-pixel operations
//! build up an [`ImageExpr`] tree; nothing is evaluated until the tree is
//! handed to [`ImageProvider::reduce_region`](crate::ImageProvider::reduce_region)
//! or [`ImageProvider::issue_map_credential`](crate::ImageProvider::issue_map_credential).
//!
//! Pixels where an operation is undefined (division by zero, masked input)
//! stay invalid through the rest of the tree and are not counted by reducers.

use field_common::FieldGeometry;
use serde::{Deserialize, Serialize};

/// Binary per-pixel arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    /// Apply to two pixel values. Division by zero yields NaN.
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ArithmeticOp::Add => lhs + rhs,
            ArithmeticOp::Subtract => lhs - rhs,
            ArithmeticOp::Multiply => lhs * rhs,
            ArithmeticOp::Divide => {
                if rhs == 0.0 {
                    f64::NAN
                } else {
                    lhs / rhs
                }
            }
        }
    }
}

/// Per-pixel comparison against a constant, producing a 0/1 mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Gte,
}

impl CompareOp {
    pub fn apply(&self, value: f64, threshold: f64) -> bool {
        match self {
            CompareOp::Lt => value < threshold,
            CompareOp::Gte => value >= threshold,
        }
    }
}

/// Expression tree describing a provider-side image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageExpr {
    /// Image resolved by the provider (composite or single capture).
    Source { id: String },
    /// Single band of the input.
    Select { input: Box<ImageExpr>, band: String },
    /// Pixel-wise arithmetic between two images.
    Arithmetic {
        arith: ArithmeticOp,
        lhs: Box<ImageExpr>,
        rhs: Box<ImageExpr>,
    },
    /// Pixel-wise comparison with a constant.
    Compare {
        cmp: CompareOp,
        input: Box<ImageExpr>,
        value: f64,
    },
    /// Logical AND of two masks.
    And { lhs: Box<ImageExpr>, rhs: Box<ImageExpr> },
    /// Rename the single output band.
    Rename { input: Box<ImageExpr>, name: String },
    /// Restrict the image to a field boundary.
    Clip {
        input: Box<ImageExpr>,
        geometry: FieldGeometry,
    },
}

/// Opaque handle to a provider-side image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Image {
    expr: ImageExpr,
}

impl Image {
    /// Handle to an image the provider already knows by id.
    pub fn source(id: impl Into<String>) -> Self {
        Self {
            expr: ImageExpr::Source { id: id.into() },
        }
    }

    pub fn expr(&self) -> &ImageExpr {
        &self.expr
    }

    pub fn into_expr(self) -> ImageExpr {
        self.expr
    }

    fn wrap(expr: ImageExpr) -> Self {
        Self { expr }
    }

    fn boxed(&self) -> Box<ImageExpr> {
        Box::new(self.expr.clone())
    }

    pub fn select(&self, band: &str) -> Self {
        Self::wrap(ImageExpr::Select {
            input: self.boxed(),
            band: band.to_string(),
        })
    }

    fn arithmetic(&self, arith: ArithmeticOp, other: &Image) -> Self {
        Self::wrap(ImageExpr::Arithmetic {
            arith,
            lhs: self.boxed(),
            rhs: other.boxed(),
        })
    }

    pub fn add(&self, other: &Image) -> Self {
        self.arithmetic(ArithmeticOp::Add, other)
    }

    pub fn subtract(&self, other: &Image) -> Self {
        self.arithmetic(ArithmeticOp::Subtract, other)
    }

    pub fn multiply(&self, other: &Image) -> Self {
        self.arithmetic(ArithmeticOp::Multiply, other)
    }

    pub fn divide(&self, other: &Image) -> Self {
        self.arithmetic(ArithmeticOp::Divide, other)
    }

    /// `(a - b) / (a + b)` over two bands of this image.
    pub fn normalized_difference(&self, band_a: &str, band_b: &str) -> Self {
        let a = self.select(band_a);
        let b = self.select(band_b);
        a.subtract(&b).divide(&a.add(&b))
    }

    /// 1 where the pixel is below `value`, 0 elsewhere.
    pub fn lt(&self, value: f64) -> Self {
        Self::wrap(ImageExpr::Compare {
            cmp: CompareOp::Lt,
            input: self.boxed(),
            value,
        })
    }

    /// 1 where the pixel is at or above `value`, 0 elsewhere.
    pub fn gte(&self, value: f64) -> Self {
        Self::wrap(ImageExpr::Compare {
            cmp: CompareOp::Gte,
            input: self.boxed(),
            value,
        })
    }

    pub fn and(&self, other: &Image) -> Self {
        Self::wrap(ImageExpr::And {
            lhs: self.boxed(),
            rhs: other.boxed(),
        })
    }

    pub fn rename(&self, name: &str) -> Self {
        Self::wrap(ImageExpr::Rename {
            input: self.boxed(),
            name: name.to_string(),
        })
    }

    pub fn clip(&self, geometry: &FieldGeometry) -> Self {
        Self::wrap(ImageExpr::Clip {
            input: self.boxed(),
            geometry: geometry.clone(),
        })
    }

    /// Name of the band this image produces, if it has been named.
    pub fn band_name(&self) -> Option<&str> {
        fn walk(expr: &ImageExpr) -> Option<&str> {
            match expr {
                ImageExpr::Rename { name, .. } => Some(name),
                ImageExpr::Select { band, .. } => Some(band),
                ImageExpr::Arithmetic { lhs, .. } | ImageExpr::And { lhs, .. } => walk(lhs),
                ImageExpr::Compare { input, .. } | ImageExpr::Clip { input, .. } => walk(input),
                ImageExpr::Source { .. } => None,
            }
        }
        walk(&self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_build_tree() {
        let img = Image::source("composite-1");
        let ndvi = img.normalized_difference("B8", "B4").rename("NDVI");
        match ndvi.expr() {
            ImageExpr::Rename { input, name } => {
                assert_eq!(name, "NDVI");
                assert!(matches!(
                    input.as_ref(),
                    ImageExpr::Arithmetic {
                        arith: ArithmeticOp::Divide,
                        ..
                    }
                ));
            }
            other => panic!("unexpected root: {:?}", other),
        }
        assert_eq!(ndvi.band_name(), Some("NDVI"));
    }

    #[test]
    fn test_mask_keeps_band_name() {
        let mask = Image::source("x").select("NDMI").lt(0.3);
        assert_eq!(mask.band_name(), Some("NDMI"));
    }

    #[test]
    fn test_divide_by_zero_is_nan() {
        assert!(ArithmeticOp::Divide.apply(1.0, 0.0).is_nan());
        assert_eq!(ArithmeticOp::Divide.apply(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_expression_serializes_with_op_tag() {
        let expr = Image::source("abc").select("B4");
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["op"], "select");
        assert_eq!(json["band"], "B4");
        assert_eq!(json["input"]["op"], "source");
    }
}
