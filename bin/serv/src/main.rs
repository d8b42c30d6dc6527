use eklan_api::{config::ApiConfig, state::ApiState};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    eklan_api::tracing::init_tracing(config.environment);

    // Database pool + migrations
    let pool = eklan_db::create_pool(&config.database_url, config.database_max_connections).await?;
    eklan_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    // Prometheus exporter
    let metrics_handle = eklan_api::metrics::init_metrics()?;

    // Background jobs (periodic confidence refresh)
    let _jobs = eklan_api::jobs::start_background_jobs(pool.clone());

    let state = ApiState::new(&config, pool);

    // Create the application router
    let app = eklan_api::router::router()
        .with_state(state)
        .route(
            "/metrics",
            axum::routing::get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        .layer(CorsLayer::very_permissive());

    // Start the server. ConnectInfo is required by the per-IP rate limiter.
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server running on http://localhost:{}", config.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
