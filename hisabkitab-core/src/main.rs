use dotenv::dotenv;
use hisabkitab_core::{create_router, db, AppState, Config};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting Hisab Kitab...");

    let config = Config::from_env()?;
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", config.data_dir.display(), e))?;

    // Initialize database connection pool
    let db_pool = db::create_pool(&config.database_path()).await?;

    let host = config.host.clone();
    let port = config.port;
    let app = create_router(AppState::new(db_pool, config));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}:{}: {}", host, port, e))?;

    info!("Server listening on {}:{}", host, port);

    // Start the server
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
