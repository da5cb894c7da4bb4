//! Features API Server
//!
//! OGC API - Features server for the water-quality collections.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use storage::{FeatureStore, PgFeatureStore};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use features_api::{
    build_router, AppState, AuthConfig, CollectionRegistry, CollectionsFile, ServiceConfig,
};

/// Features API Server
#[derive(Parser, Debug)]
#[command(name = "features-api")]
#[command(about = "OGC API - Features server for geo-referenced water-quality data")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "FEATURES_LISTEN_ADDR")]
    listen: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 10, env = "FEATURES_DB_MAX_CONNECTIONS")]
    max_connections: u32,

    /// Mount point segment of the API
    #[arg(long, default_value = "api", env = "FEATURES_MOUNT")]
    mount: String,

    /// Collections catalog (YAML)
    #[arg(long, default_value = "config/collections.yaml", env = "FEATURES_COLLECTIONS")]
    collections: String,

    /// Public origin used in links instead of the request's Host
    #[arg(long, env = "FEATURES_PUBLIC_URL")]
    public_url: Option<String>,

    /// Require HTTP Basic authentication
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "FEATURES_AUTH_ENABLED"
    )]
    auth_enabled: bool,

    /// Basic auth username
    #[arg(long, env = "API_USR", hide_env_values = true)]
    api_user: Option<String>,

    /// Basic auth password
    #[arg(long, env = "API_PWD", hide_env_values = true)]
    api_password: Option<String>,

    /// Realm sent in WWW-Authenticate challenges
    #[arg(long, default_value = "OGC API Features", env = "FEATURES_AUTH_REALM")]
    auth_realm: String,

    /// Count and fetch items within one REPEATABLE READ transaction
    #[arg(long, default_value_t = false, env = "FEATURES_CONSISTENT_COUNTS")]
    consistent_counts: bool,

    /// Include raw error messages in 500 responses
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "FEATURES_EXPOSE_ERROR_DETAIL"
    )]
    expose_error_detail: bool,

    /// Prometheus exporter listen address
    #[arg(long, env = "FEATURES_METRICS_ADDR")]
    metrics_listen: Option<SocketAddr>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "FEATURES_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting features API server");

    let auth = if args.auth_enabled {
        AuthConfig::basic(
            args.api_user.unwrap_or_default(),
            args.api_password.unwrap_or_default(),
        )
        .with_realm(&args.auth_realm)
    } else {
        warn!("Authentication is disabled");
        AuthConfig::disabled().with_realm(&args.auth_realm)
    };
    auth.validate()?;

    let mut service = ServiceConfig::new(&args.mount);
    service.public_url = args.public_url;
    service.expose_error_detail = args.expose_error_detail;
    service.validate().context("Invalid --mount")?;

    let catalog = CollectionsFile::load(&args.collections)?;
    let registry = CollectionRegistry::from_definitions(catalog.collections, &service.mount_path())
        .context("Invalid collections catalog")?;
    if registry.is_empty() {
        warn!("No collections configured; only the landing, conformance and API documents will be served");
    } else {
        info!(collections = registry.len(), "Collection registry loaded");
    }

    if let Some(addr) = args.metrics_listen {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(%addr, "Metrics exporter listening");
    }

    let store = Arc::new(
        PgFeatureStore::connect(&args.database_url, args.max_connections)
            .await
            .context("Failed to connect to the feature store")?
            .with_consistent_counts(args.consistent_counts),
    );
    if let Err(e) = store.ping().await {
        error!(error = %e, "Feature store ping failed");
    }

    let state = Arc::new(AppState::new(registry, store.clone(), auth, service));
    let app = build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, mount = %args.mount, "Features API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    info!("Features API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
