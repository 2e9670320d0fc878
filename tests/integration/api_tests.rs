//! API integration tests for tile retrieval and error handling.
//!
//! Tests verify:
//! - Tier selection by zoom level (local below the threshold, remote at or above)
//! - Error cases (unknown layer, missing tile, backend failure, malformed path)
//! - HTTP response codes and headers

use axum::http::{Method, StatusCode};

use atlas_tiles::server::RouterConfig;
use atlas_tiles::tile::TileCoord;
use atlas_tiles::create_router;

use super::test_utils::{
    builtin_local_path, calls, get, router_for, send, test_router, test_service, write_tile,
    MockRemoteStore, PNG_BYTES,
};

const WATER_STRESS: &str = "annual_water_stress";

// =============================================================================
// Tile Retrieval
// =============================================================================

#[tokio::test]
async fn test_low_zoom_tile_from_local_store() {
    let tmp = tempfile::tempdir().unwrap();
    write_tile(tmp.path(), &builtin_local_path(WATER_STRESS), 3, 1, 1, PNG_BYTES);

    let remote = MockRemoteStore::new();
    let counter = remote.call_counter();
    let router = test_router(tmp.path(), remote);

    let resp = get(router, "/tiles/annual_water_stress/3/1/1.png").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("image/png"));
    assert_eq!(resp.header("cache-control"), Some("public, max-age=3600"));
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
    assert_eq!(resp.header("x-tile-source"), Some("local"));
    assert_eq!(&resp.body[..], PNG_BYTES);
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_high_zoom_tile_from_remote_store() {
    let tmp = tempfile::tempdir().unwrap();
    let remote =
        MockRemoteStore::new().with_tile(WATER_STRESS, TileCoord::new(9, 300, 200), b"remote-png");
    let counter = remote.call_counter();
    let router = test_router(tmp.path(), remote);

    let resp = get(router, "/tiles/annual_water_stress/9/300/200.png").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("image/png"));
    assert_eq!(resp.header("x-tile-source"), Some("remote"));
    assert_eq!(&resp.body[..], b"remote-png");
    assert_eq!(calls(&counter), 1);
}

#[tokio::test]
async fn test_head_request_returns_headers_only() {
    let tmp = tempfile::tempdir().unwrap();
    write_tile(tmp.path(), &builtin_local_path(WATER_STRESS), 0, 0, 0, PNG_BYTES);
    let router = test_router(tmp.path(), MockRemoteStore::new());

    let resp = send(router, Method::HEAD, "/tiles/annual_water_stress/0/0/0.png").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("image/png"));
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_custom_cache_max_age() {
    let tmp = tempfile::tempdir().unwrap();
    write_tile(tmp.path(), &builtin_local_path(WATER_STRESS), 2, 1, 1, PNG_BYTES);

    let router = create_router(
        test_service(tmp.path(), MockRemoteStore::new()),
        RouterConfig::new().with_tracing(false).with_cache_max_age(60),
    );

    let resp = get(router, "/tiles/annual_water_stress/2/1/1.png").await;
    assert_eq!(resp.header("cache-control"), Some("public, max-age=60"));
}

#[tokio::test]
async fn test_restricted_cors_drops_wildcard_origin() {
    let tmp = tempfile::tempdir().unwrap();
    write_tile(tmp.path(), &builtin_local_path(WATER_STRESS), 2, 1, 1, PNG_BYTES);

    let router = create_router(
        test_service(tmp.path(), MockRemoteStore::new()),
        RouterConfig::new()
            .with_tracing(false)
            .with_cors_origins(vec!["https://atlas.example.org".to_string()]),
    );

    let resp = get(router, "/tiles/annual_water_stress/2/1/1.png").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_ne!(resp.header("access-control-allow-origin"), Some("*"));
}

// =============================================================================
// Tier Routing
// =============================================================================

#[tokio::test]
async fn test_tier_follows_zoom_threshold() {
    let tmp = tempfile::tempdir().unwrap();
    let local_path = builtin_local_path(WATER_STRESS);

    let mut remote = MockRemoteStore::new();
    for z in 0..=12 {
        write_tile(tmp.path(), &local_path, z, 0, 0, b"local");
        remote = remote.with_tile(WATER_STRESS, TileCoord::new(z, 0, 0), b"remote");
    }
    let counter = remote.call_counter();
    let router = router_for(test_service(tmp.path(), remote));

    for z in 0..=12u32 {
        let before = calls(&counter);
        let uri = format!("/tiles/annual_water_stress/{}/0/0.png", z);
        let resp = get(router.clone(), &uri).await;

        assert_eq!(resp.status, StatusCode::OK, "z={}", z);
        if z < 7 {
            assert_eq!(resp.header("x-tile-source"), Some("local"), "z={}", z);
            assert_eq!(&resp.body[..], b"local");
            assert_eq!(calls(&counter), before, "remote contacted at z={}", z);
        } else {
            assert_eq!(resp.header("x-tile-source"), Some("remote"), "z={}", z);
            assert_eq!(&resp.body[..], b"remote");
            assert_eq!(calls(&counter), before + 1);
        }
    }
}

#[tokio::test]
async fn test_custom_threshold_moves_boundary() {
    let tmp = tempfile::tempdir().unwrap();
    let remote = MockRemoteStore::new().with_tile(WATER_STRESS, TileCoord::new(4, 0, 0), b"r");
    let counter = remote.call_counter();
    let router =
        router_for(test_service(tmp.path(), remote).with_low_zoom_threshold(4));

    let resp = get(router.clone(), "/tiles/annual_water_stress/4/0/0.png").await;
    assert_eq!(resp.header("x-tile-source"), Some("remote"));

    let resp = get(router, "/tiles/annual_water_stress/3/0/0.png").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(calls(&counter), 1);
}

// =============================================================================
// Missing Tiles
// =============================================================================

#[tokio::test]
async fn test_local_miss_reports_attempted_path() {
    let tmp = tempfile::tempdir().unwrap();
    let remote = MockRemoteStore::new().with_tile(WATER_STRESS, TileCoord::new(5, 2, 2), b"r");
    let counter = remote.call_counter();
    let router = test_router(tmp.path(), remote);

    let resp = get(router, "/tiles/annual_water_stress/5/2/2.png").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert_eq!(body["layer"], WATER_STRESS);
    assert_eq!(body["z"], 5);
    let path = body["path"].as_str().unwrap();
    assert!(path.ends_with("Water Stress/Water Stress/5/2/2.png"), "{}", path);
    // No fallback to the other tier
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_remote_miss_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let router = test_router(tmp.path(), MockRemoteStore::new());

    let resp = get(router, "/tiles/annual_water_stress/10/5/5.png").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert!(body["error"].as_str().unwrap().contains("not found"));
    assert_eq!(body["layer"], WATER_STRESS);
    assert_eq!(body["z"], 10);
    assert_eq!(body["x"], 5);
    assert_eq!(body["y"], 5);
    assert!(body.get("path").is_none());
}

#[tokio::test]
async fn test_remote_failure_is_500_without_detail() {
    let tmp = tempfile::tempdir().unwrap();
    let remote = MockRemoteStore::new().failing("InvalidAccessKeyId: key AKIA-SECRET rejected");
    let router = test_router(tmp.path(), remote);

    let resp = get(router, "/tiles/coastal_flood_risk/8/1/1.png").await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = resp.json();
    assert!(body["error"].is_string());
    let text = String::from_utf8_lossy(&resp.body);
    assert!(!text.contains("AKIA"));
    assert!(!text.contains("InvalidAccessKeyId"));
}

// =============================================================================
// Unknown Layers
// =============================================================================

#[tokio::test]
async fn test_unknown_layer_lists_available_layers() {
    let tmp = tempfile::tempdir().unwrap();
    let remote = MockRemoteStore::new();
    let counter = remote.call_counter();
    let router = test_router(tmp.path(), remote);

    let resp = get(router, "/tiles/nonexistent_layer/3/1/1.png").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert_eq!(body["error"], "Unknown layer");
    assert_eq!(
        body["availableLayers"],
        serde_json::json!(["annual_water_stress", "riverine_flood_risk", "coastal_flood_risk"])
    );
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_unknown_layer_wins_over_bad_coordinates() {
    let tmp = tempfile::tempdir().unwrap();
    let router = test_router(tmp.path(), MockRemoteStore::new());

    for uri in [
        "/tiles/nonexistent_layer/-1/-5/-3.png",
        "/tiles/nonexistent_layer/99999999999999999999/1/1.png",
        "/tiles/nonexistent_layer/abc/1/1.png",
        "/tiles/nonexistent_layer/1/1/1.jpg",
        "/tiles/nonexistent_layer/25/4294967295/4294967295.png",
    ] {
        let resp = get(router.clone(), uri).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(resp.json()["availableLayers"].as_array().unwrap().len(), 3);
    }
}

// =============================================================================
// Malformed Requests
// =============================================================================

#[tokio::test]
async fn test_malformed_tile_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let router = test_router(tmp.path(), MockRemoteStore::new());

    for uri in [
        "/tiles/annual_water_stress/abc/1/1.png",
        "/tiles/annual_water_stress/3/1/1.jpg",
        "/tiles/annual_water_stress/3/1/1",
        "/tiles/annual_water_stress/3/-1/1.png",
        "/tiles/annual_water_stress/99999999999/1/1.png",
        "/tiles/annual_water_stress/3/1",
        "/tiles/annual_water_stress/3/1/1/extra.png",
        "/tiles",
    ] {
        let resp = get(router.clone(), uri).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{}", uri);

        let body = resp.json();
        assert_eq!(body["error"], "Malformed tile request");
        assert_eq!(body["received"], uri);
        assert_eq!(body["expected"], "/tiles/{layer}/{z}/{x}/{y}.png");
    }
}

#[tokio::test]
async fn test_unrelated_path_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let router = test_router(tmp.path(), MockRemoteStore::new());

    let resp = get(router, "/not/a/route").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["error"], "Not found");
}

// =============================================================================
// Repeatability
// =============================================================================

#[tokio::test]
async fn test_repeated_requests_reread_storage() {
    let tmp = tempfile::tempdir().unwrap();
    let local_path = builtin_local_path(WATER_STRESS);
    write_tile(tmp.path(), &local_path, 1, 0, 0, b"first");
    let router = test_router(tmp.path(), MockRemoteStore::new());

    let resp = get(router.clone(), "/tiles/annual_water_stress/1/0/0.png").await;
    assert_eq!(&resp.body[..], b"first");

    write_tile(tmp.path(), &local_path, 1, 0, 0, b"second");
    let resp = get(router.clone(), "/tiles/annual_water_stress/1/0/0.png").await;
    assert_eq!(&resp.body[..], b"second");

    std::fs::remove_file(tmp.path().join(&local_path).join("1/0/0.png")).unwrap();
    let resp = get(router, "/tiles/annual_water_stress/1/0/0.png").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
