//! League results server entry point.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::signal;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::compression::CompressionLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_server::api::{create_app, AppState};
use league_server::config::{close_db, init_db, run_migrations, AppConfig, APP_CONFIG};
use league_server::utils::LeagueRules;

// High-performance memory allocator for non-MSVC targets
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "league_server=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _guard = if APP_CONFIG.sentry_dsn.is_empty() {
        tracing::warn!("Sentry DSN not configured, error tracking disabled");
        None
    } else {
        Some(sentry::init((
            APP_CONFIG.sentry_dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(APP_CONFIG.node_env.clone().into()),
                traces_sample_rate: APP_CONFIG.sentry_traces_sample_rate,
                sample_rate: 1.0,
                ..Default::default()
            },
        )))
    };

    let db = match init_db().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if APP_CONFIG.run_migrations {
        tracing::info!("Running database migrations...");
        if let Err(e) = run_migrations(&db).await {
            tracing::error!("Failed to run migrations: {}", e);
            std::process::exit(1);
        }
        tracing::info!("Database migrations completed");
    }

    if APP_CONFIG.is_production {
        check_client_bundle(&APP_CONFIG);
    }

    let state = AppState::new(db, LeagueRules::from_config(&APP_CONFIG));

    let Some(governor_config) = GovernorConfigBuilder::default()
        .per_second(APP_CONFIG.rate_limit_per_second)
        .burst_size(APP_CONFIG.rate_limit_burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
    else {
        tracing::error!(
            per_second = APP_CONFIG.rate_limit_per_second,
            burst_size = APP_CONFIG.rate_limit_burst_size,
            "Invalid rate limiter configuration"
        );
        std::process::exit(1);
    };

    // Layer order (bottom to top execution): app layers -> Compression -> Rate Limit
    let app = create_app(state, &APP_CONFIG)
        .layer(CompressionLayer::new().br(true).gzip(true).zstd(true))
        .layer(GovernorLayer::new(governor_config));

    let addr = SocketAddr::from(([0, 0, 0, 0], APP_CONFIG.server_port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, "Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        port = APP_CONFIG.server_port,
        environment = %APP_CONFIG.node_env,
        production = APP_CONFIG.is_production,
        "App listening at http://localhost:{}",
        APP_CONFIG.server_port
    );

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("Shutting down...");

    close_db().await;

    if let Some(client) = sentry::Hub::current().client() {
        client.flush(Some(Duration::from_secs(2)));
    }

    tracing::info!("Shutdown complete");
}

/// Warns when the production client bundle is missing.
fn check_client_bundle(config: &AppConfig) {
    let index = config.index_html_path();
    if index.is_file() {
        tracing::info!(dir = %config.client_build_dir.display(), "Serving client bundle");
    } else {
        tracing::warn!(
            index = %index.display(),
            "Client bundle index.html not found; non-API requests will return 404"
        );
    }
}

/// Handles shutdown signals for graceful termination.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        },
    }
}
