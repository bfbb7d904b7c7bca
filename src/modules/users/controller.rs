use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use fleetops_core::AppError;
use fleetops_models::{
    AssignGroupDto, CreateUserDto, User, UserGroupsResponse, UserPermissionsResponse,
};

use super::service::UsersService;
use crate::middleware::auth::{RequireUserAdd, RequireUserEdit, RequireUserView};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing USER_ADD or a group beyond the caller's rights"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    RequireUserAdd(auth): RequireUserAdd,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let caller = auth.user_id()?;
    let user = UsersService::create_user(state.store.as_ref(), caller, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/groups",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's groups", body = UserGroupsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user_groups(
    State(state): State<AppState>,
    _auth: RequireUserView,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserGroupsResponse>, AppError> {
    let groups = UsersService::get_user_groups(state.store.as_ref(), user_id).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/groups",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = AssignGroupDto,
    responses(
        (status = 200, description = "User added to group", body = UserGroupsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing USER_EDIT or a group beyond the caller's rights"),
        (status = 404, description = "User or group not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn add_user_to_group(
    State(state): State<AppState>,
    RequireUserEdit(auth): RequireUserEdit,
    Path(user_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignGroupDto>,
) -> Result<Json<UserGroupsResponse>, AppError> {
    let caller = auth.user_id()?;
    let groups =
        UsersService::add_user_to_group(state.store.as_ref(), caller, user_id, dto.group_id)
            .await?;
    Ok(Json(groups))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/groups/{group_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("group_id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 204, description = "User removed from group"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Membership not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn remove_user_from_group(
    State(state): State<AppState>,
    _auth: RequireUserEdit,
    Path((user_id, group_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    UsersService::remove_user_from_group(state.store.as_ref(), user_id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/permissions",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Resolved permission codes", body = UserPermissionsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user_permissions(
    State(state): State<AppState>,
    _auth: RequireUserView,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserPermissionsResponse>, AppError> {
    let permissions = UsersService::get_user_permissions(state.store.as_ref(), user_id).await?;
    Ok(Json(permissions))
}
