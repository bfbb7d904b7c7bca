use std::sync::Arc;

use fleetops_config::{CorsConfig, JwtConfig};
use fleetops_core::RightCatalog;
use fleetops_db::{PermissionStore, PgPermissionStore, PgPool};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PermissionStore>,
    pub catalog: Arc<RightCatalog>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        catalog: RightCatalog,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            jwt_config,
            cors_config,
        }
    }

    /// State backed by Postgres, with JWT and CORS settings read from the environment.
    pub fn from_pool(pool: PgPool, catalog: RightCatalog) -> Self {
        Self::new(
            Arc::new(PgPermissionStore::new(pool)),
            catalog,
            JwtConfig::from_env(),
            CorsConfig::from_env(),
        )
    }
}
