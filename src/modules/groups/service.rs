use tracing::{info, instrument};
use uuid::Uuid;

use fleetops_core::{AppError, RightCatalog};
use fleetops_db::{Grantor, PermissionStore, check_rights_grant, save_all_groups};
use fleetops_models::{
    CreateGroupDto, Group, GroupMatrix, GroupWithRights, SaveAllGroupRightsDto, SaveAllResponse,
    SaveGroupRightsDto, UpdateGroupDto,
};

use crate::metrics::track_group_rights_saved;

pub struct GroupsService;

impl GroupsService {
    #[instrument(skip(store))]
    pub async fn list_groups(
        store: &dyn PermissionStore,
    ) -> Result<Vec<GroupWithRights>, AppError> {
        let groups = store.list_groups().await?;
        let mut result = Vec::with_capacity(groups.len());

        for group in groups {
            let rights = store.list_group_rights(group.id).await?;
            result.push(GroupWithRights { group, rights });
        }

        Ok(result)
    }

    #[instrument(skip(store))]
    pub async fn get_group(
        store: &dyn PermissionStore,
        id: Uuid,
    ) -> Result<GroupWithRights, AppError> {
        let group = store.get_group(id).await?;
        let rights = store.list_group_rights(id).await?;
        Ok(GroupWithRights { group, rights })
    }

    /// The group's rights laid out against the whole catalog.
    #[instrument(skip(store, catalog))]
    pub async fn get_matrix(
        store: &dyn PermissionStore,
        catalog: &RightCatalog,
        id: Uuid,
    ) -> Result<GroupMatrix, AppError> {
        let group = store.get_group(id).await?;
        let rights = store.list_group_rights(id).await?;

        Ok(GroupMatrix::build(
            group.id,
            group.name,
            catalog,
            rights.iter().map(|r| r.code.as_str()),
        ))
    }

    /// Create a custom group, optionally granting rights in the same call.
    ///
    /// Right codes are checked first, so an unknown code or one the caller
    /// does not hold creates nothing.
    #[instrument(skip(store, dto), fields(name = %dto.name))]
    pub async fn create_group(
        store: &dyn PermissionStore,
        caller: Uuid,
        dto: CreateGroupDto,
    ) -> Result<GroupWithRights, AppError> {
        let codes = dto.right_codes.unwrap_or_default();

        if !codes.is_empty() {
            check_rights_grant(store, Grantor::User(caller), None, &codes).await?;
        }

        let group = store
            .create_group(&dto.name, dto.description.as_deref())
            .await?;
        let rights = if codes.is_empty() {
            Vec::new()
        } else {
            store.replace_group_rights(group.id, &codes).await?
        };

        info!(group_id = %group.id, rights = rights.len(), "Group created");
        Ok(GroupWithRights { group, rights })
    }

    #[instrument(skip(store, dto))]
    pub async fn update_group(
        store: &dyn PermissionStore,
        id: Uuid,
        dto: UpdateGroupDto,
    ) -> Result<Group, AppError> {
        let group = store
            .update_group(id, dto.name.as_deref(), dto.description.as_deref())
            .await?;
        Ok(group)
    }

    #[instrument(skip(store))]
    pub async fn delete_group(store: &dyn PermissionStore, id: Uuid) -> Result<(), AppError> {
        store.delete_group(id).await?;
        info!(group_id = %id, "Group deleted");
        Ok(())
    }

    /// Replace one group's rights with exactly the given codes.
    ///
    /// Codes the group does not hold yet must be held by `caller`.
    #[instrument(skip(store, dto), fields(rights = dto.right_codes.len()))]
    pub async fn save_group_rights(
        store: &dyn PermissionStore,
        caller: Uuid,
        id: Uuid,
        dto: SaveGroupRightsDto,
    ) -> Result<GroupWithRights, AppError> {
        let checked =
            check_rights_grant(store, Grantor::User(caller), Some(id), &dto.right_codes).await;
        let saved = match checked {
            Ok(()) => store.replace_group_rights(id, &dto.right_codes).await,
            Err(e) => Err(e),
        };
        track_group_rights_saved(saved.is_ok());

        let rights = saved?;
        let group = store.get_group(id).await?;
        Ok(GroupWithRights { group, rights })
    }

    /// Save each listed group independently and report every outcome.
    #[instrument(skip_all, fields(groups = dto.groups.len()))]
    pub async fn save_all_group_rights(
        store: &dyn PermissionStore,
        caller: Uuid,
        dto: SaveAllGroupRightsDto,
    ) -> SaveAllResponse {
        let results = save_all_groups(store, Grantor::User(caller), &dto.groups).await;
        for outcome in &results {
            track_group_rights_saved(outcome.is_saved());
        }
        SaveAllResponse { results }
    }
}

#[cfg(test)]
mod tests {
    use fleetops_core::tiers::default_rules;
    use fleetops_db::{MemoryPermissionStore, run_seed};
    use fleetops_models::GroupRightsEntry;

    use super::*;

    async fn seeded() -> MemoryPermissionStore {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        run_seed(&store, &catalog, &default_rules()).await.unwrap();
        store
    }

    async fn member_of(store: &MemoryPermissionStore, group: &str) -> Uuid {
        let user = store
            .create_user("Grace Njeri", &format!("{}@fleet.test", Uuid::new_v4()), "hash")
            .await
            .unwrap();
        let group = store.get_group_by_name(group).await.unwrap();
        store.add_user_group(user.id, group.id).await.unwrap();
        user.id
    }

    async fn codes_of(store: &MemoryPermissionStore, group: &str) -> Vec<String> {
        let group = store.get_group_by_name(group).await.unwrap();
        store
            .list_group_rights(group.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect()
    }

    fn dispatch(codes: &[&str]) -> CreateGroupDto {
        CreateGroupDto {
            name: "Dispatch".to_string(),
            description: Some("Night shift".to_string()),
            right_codes: Some(codes.iter().map(|c| c.to_string()).collect()),
        }
    }

    #[tokio::test]
    async fn test_create_group_with_unknown_code_creates_nothing() {
        let store = seeded().await;
        let caller = member_of(&store, "SuperAdmin").await;
        let before = store.list_groups().await.unwrap().len();

        let dto = dispatch(&["TRIP_VIEW", "TRIP_LAUNCH"]);
        let err = GroupsService::create_group(&store, caller, dto)
            .await
            .unwrap_err();

        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(store.list_groups().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_create_group_grants_rights() {
        let store = seeded().await;
        let caller = member_of(&store, "SuperAdmin").await;

        let dto = dispatch(&["TRIP_VIEW", "TRIP_EDIT"]);
        let created = GroupsService::create_group(&store, caller, dto)
            .await
            .unwrap();

        assert!(!created.group.is_system_group);
        assert_eq!(created.rights.len(), 2);
    }

    #[tokio::test]
    async fn test_create_group_beyond_caller_rights_creates_nothing() {
        let store = seeded().await;
        let caller = member_of(&store, "LEVEL1").await;
        let before = store.list_groups().await.unwrap().len();

        let err = GroupsService::create_group(&store, caller, dispatch(&["TRIP_VIEW"]))
            .await
            .unwrap_err();

        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(store.list_groups().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_save_rejects_self_escalation() {
        let store = seeded().await;
        let caller = member_of(&store, "LEVEL2").await;
        let level2 = store.get_group_by_name("LEVEL2").await.unwrap();
        let before = codes_of(&store, "LEVEL2").await;

        let mut right_codes = before.clone();
        right_codes.push("TRIP_DELETE".to_string());
        let err = GroupsService::save_group_rights(
            &store,
            caller,
            level2.id,
            SaveGroupRightsDto { right_codes },
        )
        .await
        .unwrap_err();

        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(codes_of(&store, "LEVEL2").await, before);
    }

    #[tokio::test]
    async fn test_matrix_reflects_stored_rights() {
        let store = seeded().await;
        let catalog = RightCatalog::standard().unwrap();
        let level3 = store.get_group_by_name("LEVEL3").await.unwrap();

        let matrix = GroupsService::get_matrix(&store, &catalog, level3.id)
            .await
            .unwrap();

        assert_eq!(matrix.group_name, "LEVEL3");
        assert!(matrix.is_granted("TRIP_VIEW"));
        assert!(!matrix.is_granted("TRIP_EDIT"));
        assert!(
            matrix
                .selected_codes()
                .iter()
                .all(|c| c.ends_with("_VIEW"))
        );
    }

    #[tokio::test]
    async fn test_save_all_keeps_going_after_failure() {
        let store = seeded().await;
        let caller = member_of(&store, "LEVEL2").await;
        let super_admin = store.get_group_by_name("SuperAdmin").await.unwrap();
        let level2 = store.get_group_by_name("LEVEL2").await.unwrap();
        let level3 = store.get_group_by_name("LEVEL3").await.unwrap();

        let mut escalated = codes_of(&store, "LEVEL2").await;
        escalated.push("OVERTIME_DELETE".to_string());

        let response = GroupsService::save_all_group_rights(
            &store,
            caller,
            SaveAllGroupRightsDto {
                groups: vec![
                    GroupRightsEntry {
                        group_id: super_admin.id,
                        right_codes: codes_of(&store, "SuperAdmin").await,
                    },
                    GroupRightsEntry {
                        group_id: level2.id,
                        right_codes: escalated,
                    },
                    GroupRightsEntry {
                        group_id: level3.id,
                        right_codes: vec!["CITY_VIEW".to_string()],
                    },
                ],
            },
        )
        .await;

        assert!(response.results[0].is_saved());
        assert!(!response.results[1].is_saved());
        assert!(response.results[2].is_saved());
        assert_eq!(
            store.list_group_rights(super_admin.id).await.unwrap().len(),
            RightCatalog::standard().unwrap().len()
        );
        assert_eq!(codes_of(&store, "LEVEL3").await, vec!["CITY_VIEW"]);
    }
}
