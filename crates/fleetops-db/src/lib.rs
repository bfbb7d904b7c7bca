//! # FleetOps DB
//!
//! Database pool, permission storage and startup seeding for the FleetOps API.
//!
//! - [`store`]: the [`PermissionStore`] trait with Postgres and in-memory backends
//! - [`seed`]: the additive seeding run and the per-group save-all helper
//! - [`grants`]: the grant ceiling applied to API callers
//! - [`error`]: [`StoreError`] and its mapping onto HTTP errors
//!
//! # Example
//!
//! ```ignore
//! use fleetops_core::{RightCatalog, tiers::default_rules};
//! use fleetops_db::{PgPermissionStore, init_db_pool, run_migrations, seed::run_seed};
//!
//! let pool = init_db_pool(&database_url, &server_config).await?;
//! run_migrations(&pool).await?;
//! let store = PgPermissionStore::new(pool);
//! let report = run_seed(&store, &RightCatalog::standard()?, &default_rules()).await?;
//! ```

pub mod error;
pub mod grants;
pub mod seed;
pub mod store;

use fleetops_config::ServerConfig;
use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;
pub use grants::{Grantor, check_membership_grant, check_rights_grant};
pub use seed::{SeedReport, run_seed, save_all_groups};
pub use store::{MemoryPermissionStore, PermissionStore, PgPermissionStore};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connect a PostgreSQL pool sized by `DATABASE_MAX_CONNECTIONS`.
pub async fn init_db_pool(
    database_url: &str,
    config: &ServerConfig,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
}

/// Apply the SQL files under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
