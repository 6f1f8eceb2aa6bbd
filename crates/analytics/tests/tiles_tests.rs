//! Map tile service tests: cache-first lookup and per-layer rendering.

use std::sync::Arc;
use std::time::Duration;

use analytics::{AnalyticsConfig, MapTileService, TileRequest, DEFAULT_FIELD_ID};
use field_common::MapLayer;
use imagery::ANOMALY_MAP_SCALE;
use storage::{MapCredentialCache, MemoryMapCache};
use test_utils::{date, period, square_field, Operation, Scene, SyntheticProvider};

fn request(layer: MapLayer, field_id: &str) -> TileRequest {
    TileRequest {
        layer,
        field_id: field_id.to_string(),
        geometry: square_field(),
        period: period("2025-06-01", "2025-06-30"),
    }
}

fn service(
    provider: Arc<SyntheticProvider>,
    cache: Arc<MemoryMapCache>,
) -> MapTileService {
    MapTileService::new(provider, cache, AnalyticsConfig::default())
}

fn provider() -> Arc<SyntheticProvider> {
    Arc::new(SyntheticProvider::new().with_composite(Scene::uniform(4, 0.6, 0.2)))
}

#[tokio::test]
async fn test_second_request_served_from_cache() {
    let provider = provider();
    let cache = Arc::new(MemoryMapCache::new());
    let service = service(provider.clone(), cache.clone());

    let first = service
        .tile(&request(MapLayer::Ndvi, DEFAULT_FIELD_ID))
        .await
        .unwrap();
    assert!(!first.cached);
    assert_eq!(
        first.tile_url,
        "https://earthengine.googleapis.com/v1/map-1/tiles/{z}/{x}/{y}?token=token-1"
    );
    assert_eq!(first.description, MapLayer::Ndvi.description());

    let second = service
        .tile(&request(MapLayer::Ndvi, DEFAULT_FIELD_ID))
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(second.tile_url, first.tile_url);
    assert_eq!(provider.credentials_issued(), 1);

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_cache_keyed_by_field_and_layer() {
    let provider = provider();
    let cache = Arc::new(MemoryMapCache::new());
    let service = service(provider.clone(), cache.clone());

    service.tile(&request(MapLayer::Ndvi, "north")).await.unwrap();
    service.tile(&request(MapLayer::Moisture, "north")).await.unwrap();
    let south = service.tile(&request(MapLayer::Ndvi, "south")).await.unwrap();

    assert!(!south.cached);
    assert_eq!(provider.credentials_issued(), 3);
    assert_eq!(cache.len().await, 3);
}

#[tokio::test]
async fn test_expired_credential_is_reissued() {
    let provider = provider();
    let cache = Arc::new(MemoryMapCache::with_ttl(Duration::from_millis(40)));
    let service = service(provider.clone(), cache.clone());
    let req = request(MapLayer::Productivity, "f1");

    service.tile(&req).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    let again = service.tile(&req).await.unwrap();
    assert!(!again.cached);
    assert!(again.tile_url.contains("map-2"));
    assert_eq!(provider.credentials_issued(), 2);
    assert_eq!(cache.stats().await.expired, 1);

    let cached = service.tile(&req).await.unwrap();
    assert!(cached.cached);
}

#[tokio::test]
async fn test_credential_failure_is_not_cached() {
    let provider = Arc::new(
        SyntheticProvider::new()
            .with_composite(Scene::uniform(4, 0.6, 0.2))
            .fail_on(Operation::Credential),
    );
    let cache = Arc::new(MemoryMapCache::new());
    let service = service(provider.clone(), cache.clone());

    let err = service
        .tile(&request(MapLayer::Moisture, "f1"))
        .await
        .unwrap_err();
    assert!(!err.is_validation());
    assert!(cache.is_empty().await);
    assert!(cache.get("f1", MapLayer::Moisture).await.is_none());
}

#[tokio::test]
async fn test_anomaly_layer_reduces_midpoint_at_coarse_scale() {
    let current = period("2025-06-01", "2025-06-30");
    let provider = Arc::new(
        SyntheticProvider::new()
            .with_composite_for(current, Scene::uniform(4, 0.5, 0.2))
            .with_composite_for(current.shifted_back(30).unwrap(), Scene::uniform(4, 0.6, 0.2)),
    );
    let cache = Arc::new(MemoryMapCache::new());
    let service = service(provider.clone(), cache);

    let response = service
        .tile(&request(MapLayer::Anomaly, "f1"))
        .await
        .unwrap();
    assert!(!response.cached);

    let scales: Vec<f64> = provider.reductions().iter().map(|p| p.scale).collect();
    assert_eq!(scales, vec![ANOMALY_MAP_SCALE]);
}

#[tokio::test]
async fn test_every_layer_renders() {
    let current = period("2025-06-01", "2025-06-30");
    let provider = Arc::new(SyntheticProvider::new().with_composite(Scene::uniform(4, 0.6, 0.2)));
    let cache = Arc::new(MemoryMapCache::new());
    let service = service(provider.clone(), cache);

    for layer in MapLayer::ALL {
        let req = TileRequest {
            layer,
            field_id: "all".to_string(),
            geometry: square_field(),
            period: current,
        };
        let response = service.tile(&req).await.unwrap();
        assert!(!response.cached, "{} should be freshly issued", layer);
    }
    assert_eq!(provider.credentials_issued(), MapLayer::ALL.len());
}

#[test]
fn test_resolve_period_uses_layer_lookback() {
    let service = service(provider(), Arc::new(MemoryMapCache::new()));
    let today = date("2025-06-30");

    let anomaly = service
        .resolve_period(MapLayer::Anomaly, None, None, today)
        .unwrap();
    assert_eq!(anomaly.start_date, date("2025-06-15"));

    let ndvi = service
        .resolve_period(MapLayer::Ndvi, None, None, today)
        .unwrap();
    assert_eq!(ndvi.start_date, date("2025-05-31"));
}
