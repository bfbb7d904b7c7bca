use tracing::{info, instrument};
use uuid::Uuid;

use fleetops_core::{AppError, hash_password};
use fleetops_db::{Grantor, PermissionStore, check_membership_grant};
use fleetops_models::{CreateUserDto, User, UserGroupsResponse, UserPermissionsResponse};

pub struct UsersService;

impl UsersService {
    /// Create a user and add them to `group_ids`.
    ///
    /// Every group is checked against what `caller` may hand out before the
    /// user row is written.
    #[instrument(skip(store, dto), fields(email = %dto.email))]
    pub async fn create_user(
        store: &dyn PermissionStore,
        caller: Uuid,
        dto: CreateUserDto,
    ) -> Result<User, AppError> {
        for group_id in &dto.group_ids {
            check_membership_grant(store, Grantor::User(caller), *group_id).await?;
        }

        let hashed = hash_password(&dto.password)?;
        let user = store.create_user(&dto.full_name, &dto.email, &hashed).await?;

        for group_id in &dto.group_ids {
            store.add_user_group(user.id, *group_id).await?;
        }

        info!(user_id = %user.id, groups = dto.group_ids.len(), "User created");
        Ok(user)
    }

    #[instrument(skip(store))]
    pub async fn get_user_groups(
        store: &dyn PermissionStore,
        user_id: Uuid,
    ) -> Result<UserGroupsResponse, AppError> {
        store.get_user(user_id).await?;
        let groups = store.list_user_groups(user_id).await?;
        Ok(UserGroupsResponse { user_id, groups })
    }

    /// Add a user to a group whose rights `caller` already holds.
    #[instrument(skip(store))]
    pub async fn add_user_to_group(
        store: &dyn PermissionStore,
        caller: Uuid,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<UserGroupsResponse, AppError> {
        store.get_user(user_id).await?;
        check_membership_grant(store, Grantor::User(caller), group_id).await?;
        store.add_user_group(user_id, group_id).await?;

        info!(%user_id, %group_id, "User added to group");
        Self::get_user_groups(store, user_id).await
    }

    #[instrument(skip(store))]
    pub async fn remove_user_from_group(
        store: &dyn PermissionStore,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<(), AppError> {
        store.remove_user_group(user_id, group_id).await?;
        info!(%user_id, %group_id, "User removed from group");
        Ok(())
    }

    /// Union of the rights of every group the user is in.
    #[instrument(skip(store))]
    pub async fn get_user_permissions(
        store: &dyn PermissionStore,
        user_id: Uuid,
    ) -> Result<UserPermissionsResponse, AppError> {
        store.get_user(user_id).await?;
        let permissions = store.get_user_permissions(user_id).await?;
        Ok(UserPermissionsResponse {
            user_id,
            permissions,
        })
    }
}
