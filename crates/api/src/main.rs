//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use api::AppState;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use store::{CartStore, OrderRepository, PostgresCartStore, PostgresOrderRepository};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve<CS, R>(state: Arc<AppState<CS, R>>, config: &Config, metrics: PrometheusHandle)
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let app = api::create_app(state, metrics);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Load configuration and wire the stores
    let config = Config::from_env();

    match config.database_url.clone() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .expect("failed to connect to database");
            store::apply_schema(&pool).await.expect("failed to apply schema");
            tracing::info!("using PostgreSQL stores");

            let state = api::build_state(
                PostgresCartStore::new(pool.clone()),
                PostgresOrderRepository::new(pool),
                &config,
            );
            serve(state, &config, metrics_handle).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory stores");
            let state = api::create_default_state(&config);
            serve(state, &config, metrics_handle).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
