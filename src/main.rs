use dotenvy::dotenv;
use tracing::{error, info};

use fleetops::metrics::{init_metrics, track_seed_run};
use fleetops::router::init_router;
use fleetops::state::AppState;
use fleetops_config::ServerConfig;
use fleetops_core::RightCatalog;
use fleetops_core::tiers::default_rules;
use fleetops_db::{PgPermissionStore, init_db_pool, run_migrations, run_seed};

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = fleetops::logging::init_tracing() {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let metrics_handle = init_metrics();
    let server_config = ServerConfig::from_env();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            error!("DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    let pool = match init_db_pool(&database_url, &server_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let catalog = match RightCatalog::standard() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "Invalid right catalog");
            std::process::exit(1);
        }
    };

    // The server must not accept traffic with a partially seeded permission set.
    let store = PgPermissionStore::new(pool.clone());
    match run_seed(&store, &catalog, &default_rules()).await {
        Ok(report) => track_seed_run(true, report.assignments_created),
        Err(e) => {
            track_seed_run(false, 0);
            error!(error = %e, "Permission seeding failed");
            std::process::exit(1);
        }
    }

    let state = AppState::from_pool(pool, catalog);
    let app = init_router(state, metrics_handle);

    let address = server_config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %address, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{address}");
    info!("📚 Swagger UI available at http://{address}/swagger-ui");
    info!("📖 Scalar UI available at http://{address}/scalar");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
