#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use restaurant_orders::{
    api::{self, AppState},
    config::{database, settings},
    core::catalog,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load application settings
    let app_settings = settings::load_default_settings()
        .inspect_err(|e| error!("Critical error loading application settings: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed menus on first start
    catalog::seed_menus(&db, &app_settings.menus)
        .await
        .inspect(|count| info!("Seeded {} menu(s).", count))
        .inspect_err(|e| error!("Failed to seed menus: {}", e))?;

    // 6. Serve until Ctrl-C
    let bind_address = app_settings.server.bind_address.clone();
    let app = api::router(AppState::new(db, app_settings));
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
