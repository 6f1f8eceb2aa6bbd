//! In-memory image provider for tests.
//!
//! [`SyntheticProvider`] holds [`Scene`]s and evaluates [`ImageExpr`] trees
//! against them pixel by pixel, so analytics code can be exercised end to
//! end without a remote backend. Pixels that are masked or undefined (NaN)
//! are skipped by every reducer, matching the backend behaviour.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use field_common::{AnalysisPeriod, FieldGeometry};
use imagery::{
    Capture, Image, ImageExpr, ImageProvider, MapCredential, ProviderError, ReduceParams,
    ReducedValues, Reducer, Result, VisualizationParams,
};

use crate::generators::Scene;

/// Provider operation that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Resolve,
    Captures,
    Reduce,
    Credential,
}

enum Value<'a> {
    Scene(&'a Scene),
    Band(Vec<Option<f64>>),
}

/// Test double for [`ImageProvider`].
#[derive(Default)]
pub struct SyntheticProvider {
    scenes: Vec<Scene>,
    default_composite: Option<usize>,
    composites: Vec<(AnalysisPeriod, usize)>,
    captures: Vec<(NaiveDate, usize)>,
    failures: Mutex<HashSet<Operation>>,
    credentials_issued: AtomicUsize,
    reductions: Mutex<Vec<ReduceParams>>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_scene(&mut self, scene: Scene) -> usize {
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    /// Composite returned for any period without a specific entry.
    pub fn with_composite(mut self, scene: Scene) -> Self {
        let idx = self.push_scene(scene);
        self.default_composite = Some(idx);
        self
    }

    /// Composite returned for exactly this period.
    pub fn with_composite_for(mut self, period: AnalysisPeriod, scene: Scene) -> Self {
        let idx = self.push_scene(scene);
        self.composites.push((period, idx));
        self
    }

    /// Single capture on `date`. Captures are listed in insertion order.
    pub fn with_capture(mut self, date: NaiveDate, scene: Scene) -> Self {
        let idx = self.push_scene(scene);
        self.captures.push((date, idx));
        self
    }

    /// Make every call of `operation` fail until cleared.
    pub fn fail_on(self, operation: Operation) -> Self {
        self.set_failure(operation, true);
        self
    }

    pub fn set_failure(&self, operation: Operation, failing: bool) {
        let mut failures = self.failures.lock().unwrap();
        if failing {
            failures.insert(operation);
        } else {
            failures.remove(&operation);
        }
    }

    /// Number of map credentials issued so far.
    pub fn credentials_issued(&self) -> usize {
        self.credentials_issued.load(Ordering::SeqCst)
    }

    /// Sampling parameters of every reduction, in call order.
    pub fn reductions(&self) -> Vec<ReduceParams> {
        self.reductions.lock().unwrap().clone()
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if !self.failures.lock().unwrap().contains(&operation) {
            return Ok(());
        }
        Err(match operation {
            Operation::Resolve => ProviderError::image_retrieval("injected failure"),
            Operation::Captures => ProviderError::image_retrieval("injected capture failure"),
            Operation::Reduce => ProviderError::reduction("injected failure"),
            Operation::Credential => ProviderError::credential("injected failure"),
        })
    }

    fn scene_id(idx: usize) -> String {
        format!("scene-{}", idx)
    }

    fn scene_by_id(&self, id: &str) -> Result<&Scene> {
        id.strip_prefix("scene-")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|idx| self.scenes.get(idx))
            .ok_or_else(|| ProviderError::reduction(format!("unknown image {}", id)))
    }

    fn evaluate<'a>(&'a self, expr: &ImageExpr) -> Result<Value<'a>> {
        match expr {
            ImageExpr::Source { id } => Ok(Value::Scene(self.scene_by_id(id)?)),
            ImageExpr::Select { input, band } => match self.evaluate(input)? {
                Value::Scene(scene) => scene
                    .band(band)
                    .cloned()
                    .map(Value::Band)
                    .ok_or_else(|| ProviderError::reduction(format!("band {} not found", band))),
                Value::Band(_) => Err(ProviderError::reduction("select on single-band image")),
            },
            ImageExpr::Arithmetic { arith, lhs, rhs } => {
                let (lhs, rhs) = (self.evaluate_band(lhs)?, self.evaluate_band(rhs)?);
                Ok(Value::Band(zip_pixels(&lhs, &rhs, |a, b| arith.apply(a, b))?))
            }
            ImageExpr::Compare { cmp, input, value } => {
                let band = self.evaluate_band(input)?;
                Ok(Value::Band(
                    band.iter()
                        .map(|p| p.map(|v| if cmp.apply(v, *value) { 1.0 } else { 0.0 }))
                        .collect(),
                ))
            }
            ImageExpr::And { lhs, rhs } => {
                let (lhs, rhs) = (self.evaluate_band(lhs)?, self.evaluate_band(rhs)?);
                Ok(Value::Band(zip_pixels(&lhs, &rhs, |a, b| {
                    if a != 0.0 && b != 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                })?))
            }
            ImageExpr::Rename { input, .. } | ImageExpr::Clip { input, .. } => {
                self.evaluate(input)
            }
        }
    }

    fn evaluate_band(&self, expr: &ImageExpr) -> Result<Vec<Option<f64>>> {
        match self.evaluate(expr)? {
            Value::Band(values) => Ok(values),
            Value::Scene(_) => Err(ProviderError::reduction(
                "expected a single-band image, got a multi-band scene",
            )),
        }
    }

    fn composite_for(&self, period: &AnalysisPeriod) -> Option<usize> {
        self.composites
            .iter()
            .find(|(p, _)| p == period)
            .map(|(_, idx)| *idx)
            .or(self.default_composite)
    }
}

fn zip_pixels(
    lhs: &[Option<f64>],
    rhs: &[Option<f64>],
    op: impl Fn(f64, f64) -> f64,
) -> Result<Vec<Option<f64>>> {
    if lhs.len() != rhs.len() {
        return Err(ProviderError::reduction("images differ in pixel count"));
    }
    Ok(lhs
        .iter()
        .zip(rhs)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(op(*a, *b)).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect())
}

fn reduce(values: &[f64], reducer: Reducer) -> Option<f64> {
    let n = values.len() as f64;
    match reducer {
        Reducer::Count => Some(n),
        Reducer::Sum => Some(values.iter().sum()),
        _ if values.is_empty() => None,
        Reducer::Mean => Some(values.iter().sum::<f64>() / n),
        Reducer::Min => values.iter().copied().reduce(f64::min),
        Reducer::Max => values.iter().copied().reduce(f64::max),
        Reducer::StdDev => {
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            Some(variance.sqrt())
        }
    }
}

#[async_trait]
impl ImageProvider for SyntheticProvider {
    async fn resolve_image(
        &self,
        _geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<Image> {
        self.check(Operation::Resolve)?;
        self.composite_for(period)
            .map(|idx| Image::source(Self::scene_id(idx)))
            .ok_or_else(|| ProviderError::image_retrieval(format!("no imagery for {}", period)))
    }

    async fn list_captures(
        &self,
        _geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<Vec<Capture>> {
        self.check(Operation::Captures)?;
        Ok(self
            .captures
            .iter()
            .filter(|(date, _)| *date >= period.start_date && *date <= period.end_date)
            .map(|(date, idx)| Capture {
                date: *date,
                image: Image::source(Self::scene_id(*idx)),
            })
            .collect())
    }

    async fn reduce_region(
        &self,
        image: &Image,
        _geometry: &FieldGeometry,
        reducers: &[Reducer],
        params: ReduceParams,
    ) -> Result<ReducedValues> {
        self.check(Operation::Reduce)?;
        self.reductions.lock().unwrap().push(params);

        let band = self.evaluate_band(image.expr())?;
        let valid: Vec<f64> = band.into_iter().flatten().collect();
        Ok(ReducedValues::from_optional(
            reducers.iter().map(|r| (*r, reduce(&valid, *r))),
        ))
    }

    async fn issue_map_credential(
        &self,
        image: &Image,
        _visualization: &VisualizationParams,
    ) -> Result<MapCredential> {
        self.check(Operation::Credential)?;
        // Reject images that would not render
        self.evaluate_band(image.expr())?;
        let n = self.credentials_issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MapCredential {
            map_id: format!("map-{}", n),
            token: Some(format!("token-{}", n)),
        })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
