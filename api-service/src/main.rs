use api_service::{build_router, cors_layer, AppState, Scoreboard};
use shared::{DatabaseConfig, ServiceConfig, StorageBackend, StorageConfig};
use sqlx::postgres::PgPoolOptions;

const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let service_config = ServiceConfig::from_env(DEFAULT_PORT)?;

    shared::init_tracing("api-service", service_config.is_production)?;

    if let Some(metrics_port) = service_config.metrics_port {
        shared::init_metrics(metrics_port)?;
    }

    tracing::info!("Starting API Service...");

    let storage_config = StorageConfig::from_env()?;
    let policy = storage_config.policy();

    tracing::info!(
        port = service_config.port,
        cors_origin = %service_config.cors_origin,
        backend = ?storage_config.backend,
        op_timeout_ms = storage_config.op_timeout_ms,
        max_conflict_retries = storage_config.max_conflict_retries,
        default_leaderboard_limit = service_config.default_leaderboard_limit,
        "Configuration loaded"
    );

    let scoreboard = match storage_config.backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;

            tracing::info!("Connecting to PostgreSQL...");
            let db_pool = PgPoolOptions::new()
                .max_connections(db_config.max_connections)
                .acquire_timeout(db_config.acquire_timeout())
                .connect(&db_config.url)
                .await?;

            sqlx::query("SELECT 1").execute(&db_pool).await?;
            tracing::info!("Connected to PostgreSQL successfully");

            if storage_config.run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("../migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            } else {
                tracing::info!("Skipping migrations (RUN_MIGRATIONS=false)");
            }

            Scoreboard::postgres(db_pool, policy)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Scoreboard::in_memory(policy)
        }
    };

    let state = AppState::new(scoreboard, service_config.default_leaderboard_limit);
    let app = build_router(state, cors_layer(&service_config.cors_origin)?);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", service_config.port)).await?;
    tracing::info!("API Service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down API Service...");
        })
        .await?;

    Ok(())
}
