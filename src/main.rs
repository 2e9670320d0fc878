//! Atlas tiles - XYZ tile server for risk map layers.
//!
//! This binary starts the HTTP server and hosts the client-side probe and
//! validation tools.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atlas_tiles::{
    client::{probe_coverage, validate, validate_catalog, HttpTileProbe, TileServerClient},
    config::{Cli, Command, ProbeConfig, ServeConfig, ValidateConfig},
    create_s3_client,
    layer::{LayerDescriptor, LayerRegistry},
    server::{create_router, RouterConfig},
    store::{LocalTileStore, S3TileStore},
    tile::TileService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Probe(config) => run_probe(config).await,
        Command::Validate(config) => run_validate(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let registry = match LayerRegistry::load(
        config.layers_file.as_deref(),
        &config.public_base_url(),
    ) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to load layer catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = validate_catalog(registry.list()) {
        error!("Layer catalog rejected: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Atlas tile server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Tiles path: {}", config.tiles_path.display());
    info!("  Bucket: {}", config.bucket);
    if let Some(ref project_id) = config.project_id {
        info!("  Project: {}", project_id);
    }
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
    info!(
        "  Zoom 0-{} served locally, zoom {}+ from object storage",
        config.low_zoom_threshold.saturating_sub(1),
        config.low_zoom_threshold
    );

    let local = LocalTileStore::new(&config.tiles_path);
    report_local_layers(&registry, &local).await;

    let s3_client = create_s3_client(
        config.s3_endpoint.as_deref(),
        &config.s3_region,
        config.credentials_file.as_deref(),
    )
    .await;
    let remote = S3TileStore::new(s3_client, config.bucket.clone());

    let tile_service = TileService::with_shared_registry(registry, local, remote)
        .with_low_zoom_threshold(config.low_zoom_threshold);

    let router = create_router(tile_service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/layers", addr);
    info!("    curl http://{}/layers/<layer>/info", addr);
    info!("    curl -I http://{}/tiles/<layer>/0/0/0.png", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Log which layer directories exist locally and the zoom levels they hold.
async fn report_local_layers(registry: &LayerRegistry, local: &LocalTileStore) {
    info!("");
    info!("Local layers:");

    for layer in registry.list() {
        if !local.layer_exists(layer).await {
            warn!(
                "  {} - directory missing: {}",
                layer.id,
                local.layer_dir(layer).display()
            );
            continue;
        }

        match local.scan_zoom_levels(layer).await {
            Ok(levels) => {
                let zooms: Vec<String> = levels.iter().map(|l| l.zoom.to_string()).collect();
                let tiles: usize = levels.iter().map(|l| l.total_tiles).sum();
                info!(
                    "  {} - zoom levels [{}], {} tile(s)",
                    layer.id,
                    zooms.join(", "),
                    tiles
                );
            }
            Err(e) => warn!("  {} - could not scan directory: {}", layer.id, e),
        }
    }
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "atlas_tiles=debug,tower_http=debug"
    } else {
        "atlas_tiles=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_storage_info(config.bucket.clone(), config.project_id.clone());

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Probe Command
// =============================================================================

async fn run_probe(config: ProbeConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let registry = match LayerRegistry::load(config.layers_file.as_deref(), &config.server_url) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let layers = match config.layer {
        Some(ref id) => match registry.resolve(id) {
            Ok(layer) => vec![layer],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Available layers: {}", e.available.join(", "));
                return ExitCode::FAILURE;
            }
        },
        None => registry.list().iter().collect(),
    };

    let probe = match HttpTileProbe::with_timeout(Duration::from_secs(config.timeout)) {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.status {
        return run_status(&config.server_url, probe, &layers).await;
    }

    let mut results = serde_json::Map::new();
    for layer in layers {
        let result = probe_coverage(layer, &probe).await;
        match serde_json::to_value(&result) {
            Ok(value) => {
                results.insert(layer.id.clone(), value);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    print_json(&serde_json::Value::Object(results))
}

/// Health check followed by the zoom 0-1 check of the selected layers.
async fn run_status(
    server_url: &str,
    probe: HttpTileProbe,
    layers: &[&LayerDescriptor],
) -> ExitCode {
    let client = TileServerClient::with_probe(server_url, probe);

    let health = match client.check_health().await {
        Ok(health) => health,
        Err(e) => {
            eprintln!("✗ Tile server not reachable: {}", e);
            return ExitCode::FAILURE;
        }
    };
    eprintln!("✓ Tile server {} is {}", client.base_url(), health.status);

    let checks = client.check_layers(layers.iter().copied()).await;
    let missing = checks.iter().filter(|c| c.found.is_none()).count();

    let code = print_json(&checks);
    if missing > 0 {
        eprintln!("✗ {} layer(s) served no zoom 0-1 tile", missing);
        return ExitCode::FAILURE;
    }
    code
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Validate Command
// =============================================================================

fn run_validate(config: ValidateConfig) -> ExitCode {
    let registry = match LayerRegistry::load(config.layers_file.as_deref(), &config.server_url) {
        Ok(registry) => registry,
        Err(e) => {
            println!("✗ Catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Layer Catalog Check");
    println!("═══════════════════");
    println!();

    let mut failed = 0;
    for layer in registry.list() {
        let result = validate(layer);

        if result.valid {
            println!("✓ {}", layer.id);
        } else {
            failed += 1;
            println!("✗ {}", layer.id);
            for err in &result.errors {
                println!("    error: {}", err);
            }
        }

        if config.verbose {
            for warning in &result.warnings {
                println!("    warning: {}", warning);
            }
        }
    }

    println!();
    println!("═══════════════════");
    if failed > 0 {
        println!("✗ {} of {} layer(s) failed validation", failed, registry.len());
        return ExitCode::FAILURE;
    }

    println!("✓ All {} layer(s) valid", registry.len());
    ExitCode::SUCCESS
}
