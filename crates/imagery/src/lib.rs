//! Image Provider Adapter
//!
//! This crate wraps an external geospatial compute backend. Images never
//! cross into this process as pixels: an [`Image`] is a lazily evaluated
//! expression handle that the provider resolves, and the only terminal
//! operations are region reduction and map credential issuance.
//!
//! # Architecture
//!
//! ```text
//! Analysis request
//!      │
//!      ▼
//! ImageProvider::resolve_image(geometry, period)
//!      │                         (cloud-filtered median composite)
//!      ▼
//! Image ──► indices::compute_ndvi / compute_ndmi
//!      │         (select, subtract, add, divide, rename)
//!      │
//!      ├─► ImageProvider::reduce_region(image, geometry, reducers, scale)
//!      │         └─► ReducedValues { mean, min, max, std_dev, sum, count }
//!      │
//!      └─► ImageProvider::issue_map_credential(image, visualization)
//!                └─► MapCredential { map_id, token }
//! ```

pub mod config;
pub mod error;
pub mod image;
pub mod indices;
pub mod provider;
pub mod reducer;
pub mod remote;

// Re-export commonly used types at crate root
pub use config::ProviderConfig;
pub use error::{ProviderError, Result};
pub use image::{ArithmeticOp, CompareOp, Image, ImageExpr};
pub use indices::{bands, compute_ndmi, compute_ndvi, VegetationIndex};
pub use provider::{Capture, ImageProvider, MapCredential, VisualizationParams};
pub use reducer::{
    ReduceParams, ReducedValues, Reducer, RegionStatistics, ANOMALY_MAP_SCALE, DEFAULT_MAX_PIXELS,
    INDEX_SCALE,
};
pub use remote::RemoteImageProvider;
