//! Integration tests for the layer listing, layer info and health endpoints.

use axum::http::StatusCode;

use super::test_utils::{
    builtin_local_path, calls, get, test_router, write_tile, MockRemoteStore, TEST_BUCKET,
};

// =============================================================================
// Layer Listing
// =============================================================================

#[tokio::test]
async fn test_layers_lists_only_present_directories() {
    let tmp = tempfile::tempdir().unwrap();
    write_tile(tmp.path(), &builtin_local_path("annual_water_stress"), 0, 0, 0, b"t");
    write_tile(tmp.path(), &builtin_local_path("coastal_flood_risk"), 0, 0, 0, b"t");

    let resp = get(test_router(tmp.path(), MockRemoteStore::new()), "/layers").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["lowZoomThreshold"], 7);

    let layers = body["layers"].as_array().unwrap();
    let ids: Vec<&str> = layers.iter().map(|l| l["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["annual_water_stress", "coastal_flood_risk"]);

    assert_eq!(layers[0]["name"], "Annual Water Stress");
    assert_eq!(layers[0]["path"], "Water Stress/Water Stress");
    assert!(layers[0]["lowZoomSource"].is_string());
    assert!(layers[0]["highZoomSource"].is_string());

    let storage = &body["storageInfo"];
    assert_eq!(storage["bucket"], TEST_BUCKET);
    assert!(storage["lowZoom"].as_str().unwrap().contains("0-6"));
    assert!(storage["highZoom"].as_str().unwrap().contains("7+"));
}

#[tokio::test]
async fn test_layers_empty_when_no_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let remote = MockRemoteStore::new();
    let counter = remote.call_counter();

    let resp = get(test_router(tmp.path(), remote), "/layers").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["total"], 0);
    assert!(body["layers"].as_array().unwrap().is_empty());
    assert_eq!(calls(&counter), 0);
}

// =============================================================================
// Layer Info
// =============================================================================

#[tokio::test]
async fn test_layer_info_counts_tiles_per_zoom() {
    let tmp = tempfile::tempdir().unwrap();
    let local_path = builtin_local_path("riverine_flood_risk");
    write_tile(tmp.path(), &local_path, 0, 0, 0, b"t");
    write_tile(tmp.path(), &local_path, 2, 0, 0, b"t");
    write_tile(tmp.path(), &local_path, 2, 0, 1, b"t");
    write_tile(tmp.path(), &local_path, 2, 3, 3, b"t");

    let resp = get(
        test_router(tmp.path(), MockRemoteStore::new()),
        "/layers/riverine_flood_risk/info",
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["layer"], "riverine_flood_risk");
    assert!(body["layerPath"]
        .as_str()
        .unwrap()
        .ends_with("Riverine flood risk/Riverine flood risk"));
    assert_eq!(body["availableZooms"], serde_json::json!([0, 2]));
    assert_eq!(body["minZoom"], 0);
    assert_eq!(body["maxZoom"], 2);
    assert_eq!(
        body["zoomInfo"],
        serde_json::json!([
            {"zoom": 0, "xDirectories": 1, "totalTiles": 1},
            {"zoom": 2, "xDirectories": 2, "totalTiles": 3}
        ])
    );
}

#[tokio::test]
async fn test_layer_info_empty_directory() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join(builtin_local_path("coastal_flood_risk"))).unwrap();

    let resp = get(
        test_router(tmp.path(), MockRemoteStore::new()),
        "/layers/coastal_flood_risk/info",
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["availableZooms"], serde_json::json!([]));
    assert!(body["minZoom"].is_null());
    assert!(body["maxZoom"].is_null());
}

#[tokio::test]
async fn test_layer_info_unknown_layer() {
    let tmp = tempfile::tempdir().unwrap();

    let resp = get(
        test_router(tmp.path(), MockRemoteStore::new()),
        "/layers/nonexistent_layer/info",
    )
    .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert_eq!(body["error"], "Layer not found");
    assert_eq!(body["availableLayers"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_layer_info_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();

    let resp = get(
        test_router(tmp.path(), MockRemoteStore::new()),
        "/layers/annual_water_stress/info",
    )
    .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert_eq!(body["error"], "Layer directory not found");
    assert!(body["expectedPath"]
        .as_str()
        .unwrap()
        .ends_with("Water Stress/Water Stress"));
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_configuration() {
    let tmp = tempfile::tempdir().unwrap();
    let remote = MockRemoteStore::new();
    let counter = remote.call_counter();

    let resp = get(test_router(tmp.path(), remote), "/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["bucket"], TEST_BUCKET);
    assert_eq!(body["projectId"], "atlas-test");
    assert_eq!(body["lowZoomThreshold"], 7);
    assert_eq!(body["tilesPath"], tmp.path().display().to_string());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    // Liveness only: storage is never touched
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_health_ok_without_local_tiles() {
    let resp = get(
        test_router(
            std::path::Path::new("/definitely/not/a/tile/root"),
            MockRemoteStore::new().failing("unreachable"),
        ),
        "/health",
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"], "ok");
}
