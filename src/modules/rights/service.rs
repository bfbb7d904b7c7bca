use std::collections::BTreeMap;

use tracing::instrument;

use fleetops_core::AppError;
use fleetops_core::rights::module_of;
use fleetops_db::PermissionStore;
use fleetops_models::{Right, RightModule};

pub struct RightsService;

impl RightsService {
    /// Every stored right, optionally limited to one module.
    ///
    /// The module must match exactly: `TRUCK` does not include `TRUCK_MAINTENANCE_*`.
    #[instrument(skip(store))]
    pub async fn list_rights(
        store: &dyn PermissionStore,
        module: Option<&str>,
    ) -> Result<Vec<Right>, AppError> {
        let rights = store.list_rights().await?;

        Ok(match module {
            Some(module) => rights
                .into_iter()
                .filter(|r| module_of(&r.code) == Some(module))
                .collect(),
            None => rights,
        })
    }

    /// Stored rights grouped by module, modules in name order.
    #[instrument(skip(store))]
    pub async fn list_modules(store: &dyn PermissionStore) -> Result<Vec<RightModule>, AppError> {
        let mut modules: BTreeMap<String, Vec<Right>> = BTreeMap::new();

        for right in store.list_rights().await? {
            let module = module_of(&right.code).unwrap_or(&right.code).to_string();
            modules.entry(module).or_default().push(right);
        }

        Ok(modules
            .into_iter()
            .map(|(module, rights)| RightModule { module, rights })
            .collect())
    }
}
