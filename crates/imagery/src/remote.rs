//! HTTP adapter for a remote geospatial compute backend.
//!
//! Expression trees are shipped as JSON; the backend evaluates them and
//! returns scalars or map credentials. Endpoints:
//!
//! - `POST /v1/composites` - median composite handle for a window
//! - `POST /v1/captures` - individual capture handles for a window
//! - `POST /v1/reduce` - reducer values for an expression over a geometry
//! - `POST /v1/maps` - tile credential for an expression

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use field_common::{AnalysisPeriod, FieldGeometry};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::image::{Image, ImageExpr};
use crate::indices::bands;
use crate::provider::{Capture, ImageProvider, MapCredential, VisualizationParams};
use crate::reducer::{ReduceParams, ReducedValues, Reducer};

/// Image provider backed by the remote compute API.
pub struct RemoteImageProvider {
    client: Client,
    config: ProviderConfig,
}

#[derive(Serialize)]
struct WindowRequest<'a> {
    collection: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    geometry: &'a FieldGeometry,
    start_date: String,
    end_date: String,
    max_cloud_percent: f64,
    bands: &'a [&'a str],
}

#[derive(Deserialize)]
struct CompositeResponse {
    image_id: Option<String>,
}

#[derive(Deserialize)]
struct CapturesResponse {
    captures: Vec<CaptureEntry>,
}

#[derive(Deserialize)]
struct CaptureEntry {
    date: NaiveDate,
    image_id: String,
}

#[derive(Serialize)]
struct ReduceRequest<'a> {
    expression: &'a ImageExpr,
    geometry: &'a FieldGeometry,
    reducers: &'a [Reducer],
    scale: f64,
    max_pixels: u64,
}

#[derive(Deserialize)]
struct ReduceResponse {
    values: std::collections::BTreeMap<Reducer, Option<f64>>,
}

#[derive(Serialize)]
struct MapRequest<'a> {
    expression: &'a ImageExpr,
    visualization: &'a VisualizationParams,
}

#[derive(Deserialize)]
struct BackendError {
    error: String,
}

impl RemoteImageProvider {
    /// Create a provider from configuration.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate().map_err(ProviderError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn window_request<'a>(
        &'a self,
        geometry: &'a FieldGeometry,
        period: &AnalysisPeriod,
    ) -> WindowRequest<'a> {
        WindowRequest {
            collection: &self.config.collection,
            project: self.config.project_id.as_deref(),
            geometry,
            start_date: period.start_str(),
            end_date: period.end_str(),
            max_cloud_percent: self.config.max_cloud_percent,
            bands: &bands::COMPOSITE,
        }
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{}", self.config.endpoint.trim_end_matches('/'), path);
        debug!(url = %url, "Calling imagery backend");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(ProviderError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl ImageProvider for RemoteImageProvider {
    async fn resolve_image(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<Image> {
        let response: CompositeResponse = self
            .post("/v1/composites", &self.window_request(geometry, period))
            .await
            .map_err(|e| ProviderError::image_retrieval(e.to_string()))?;

        response.image_id.map(Image::source).ok_or_else(|| {
            ProviderError::image_retrieval(format!("no imagery available for {}", period))
        })
    }

    async fn list_captures(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<Vec<Capture>> {
        let response: CapturesResponse = self
            .post("/v1/captures", &self.window_request(geometry, period))
            .await
            .map_err(|e| ProviderError::image_retrieval(e.to_string()))?;

        Ok(response
            .captures
            .into_iter()
            .map(|c| Capture {
                date: c.date,
                image: Image::source(c.image_id),
            })
            .collect())
    }

    async fn reduce_region(
        &self,
        image: &Image,
        geometry: &FieldGeometry,
        reducers: &[Reducer],
        params: ReduceParams,
    ) -> Result<ReducedValues> {
        let body = ReduceRequest {
            expression: image.expr(),
            geometry,
            reducers,
            scale: params.scale,
            max_pixels: params.max_pixels,
        };
        let response: ReduceResponse = self
            .post("/v1/reduce", &body)
            .await
            .map_err(|e| ProviderError::reduction(e.to_string()))?;

        Ok(ReducedValues::from_optional(response.values))
    }

    async fn issue_map_credential(
        &self,
        image: &Image,
        visualization: &VisualizationParams,
    ) -> Result<MapCredential> {
        let body = MapRequest {
            expression: image.expr(),
            visualization,
        };
        self.post("/v1/maps", &body)
            .await
            .map_err(|e| ProviderError::credential(e.to_string()))
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = ProviderConfig {
            timeout_secs: 0,
            ..ProviderConfig::default()
        };
        assert!(matches!(
            RemoteImageProvider::new(config),
            Err(ProviderError::Config(_))
        ));
    }

    #[test]
    fn test_reduce_response_with_nulls() {
        let json = r#"{"values": {"mean": 0.42, "min": null, "count": 12}}"#;
        let response: ReduceResponse = serde_json::from_str(json).unwrap();
        let values = ReducedValues::from_optional(response.values);
        assert_eq!(values.get(Reducer::Mean), Some(0.42));
        assert_eq!(values.get(Reducer::Min), None);
        assert_eq!(values.get(Reducer::Count), Some(12.0));
    }

    #[test]
    fn test_window_request_body() {
        let provider = RemoteImageProvider::new(ProviderConfig::default()).unwrap();
        let geometry =
            FieldGeometry::from_ring(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).unwrap();
        let period = AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
        .unwrap();

        let body = serde_json::to_value(provider.window_request(&geometry, &period)).unwrap();
        assert_eq!(body["start_date"], "2025-01-01");
        assert_eq!(body["max_cloud_percent"], 20.0);
        assert_eq!(body["bands"].as_array().unwrap().len(), 6);
        assert!(body.get("project").is_none());
    }
}
