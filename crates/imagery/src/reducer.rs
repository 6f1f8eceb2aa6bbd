//! Region reducers and their resolved values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sampling resolution for index statistics, in metres per pixel.
pub const INDEX_SCALE: f64 = 10.0;

/// Coarser resolution used to find the midpoint of the anomaly map palette.
pub const ANOMALY_MAP_SCALE: f64 = 30.0;

/// Upper bound on pixels the backend may touch in a single reduction.
pub const DEFAULT_MAX_PIXELS: u64 = 1_000_000_000;

/// Aggregation applied over all valid pixels of a single-band image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Mean,
    Min,
    Max,
    StdDev,
    Sum,
    Count,
}

impl Reducer {
    /// Mean, min, max and standard deviation.
    pub const STATISTICS: [Reducer; 4] = [
        Reducer::Mean,
        Reducer::Min,
        Reducer::Max,
        Reducer::StdDev,
    ];

    /// Mean, min and max.
    pub const MEAN_MIN_MAX: [Reducer; 3] = [Reducer::Mean, Reducer::Min, Reducer::Max];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reducer::Mean => "mean",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::StdDev => "std_dev",
            Reducer::Sum => "sum",
            Reducer::Count => "count",
        }
    }
}

/// Sampling parameters for a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReduceParams {
    /// Metres per pixel.
    pub scale: f64,
    pub max_pixels: u64,
}

impl ReduceParams {
    pub fn at_scale(scale: f64) -> Self {
        Self {
            scale,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Parameters for index statistics (10 m).
    pub fn index() -> Self {
        Self::at_scale(INDEX_SCALE)
    }

    /// Parameters for the anomaly map midpoint (30 m).
    pub fn anomaly_map() -> Self {
        Self::at_scale(ANOMALY_MAP_SCALE)
    }
}

impl Default for ReduceParams {
    fn default() -> Self {
        Self::index()
    }
}

/// Scalars returned by a reduction, keyed by reducer.
///
/// A reducer with no valid pixels to work on is absent rather than zero,
/// except `count` and `sum` which the backend reports as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReducedValues(BTreeMap<Reducer, f64>);

impl ReducedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from possibly-null backend values, dropping nulls and NaN.
    pub fn from_optional(values: impl IntoIterator<Item = (Reducer, Option<f64>)>) -> Self {
        Self(
            values
                .into_iter()
                .filter_map(|(r, v)| v.filter(|v| v.is_finite()).map(|v| (r, v)))
                .collect(),
        )
    }

    pub fn insert(&mut self, reducer: Reducer, value: f64) {
        self.0.insert(reducer, value);
    }

    pub fn get(&self, reducer: Reducer) -> Option<f64> {
        self.0.get(&reducer).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mean/min/max/standard deviation of an index over a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionStatistics {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std_dev: Option<f64>,
}

impl From<&ReducedValues> for RegionStatistics {
    fn from(values: &ReducedValues) -> Self {
        Self {
            mean: values.get(Reducer::Mean),
            min: values.get(Reducer::Min),
            max: values.get(Reducer::Max),
            std_dev: values.get(Reducer::StdDev),
        }
    }
}
