use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use fleetops_core::AppError;
use fleetops_models::{
    CreateGroupDto, Group, GroupMatrix, GroupWithRights, SaveAllGroupRightsDto, SaveAllResponse,
    SaveGroupRightsDto, UpdateGroupDto,
};

use super::service::GroupsService;
use crate::middleware::auth::{
    RequireGroupAdd, RequireGroupDelete, RequireGroupEdit, RequireGroupView,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups with their rights", body = Vec<GroupWithRights>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn get_groups(
    State(state): State<AppState>,
    _auth: RequireGroupView,
) -> Result<Json<Vec<GroupWithRights>>, AppError> {
    let groups = GroupsService::list_groups(state.store.as_ref()).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group with its rights", body = GroupWithRights),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn get_group(
    State(state): State<AppState>,
    _auth: RequireGroupView,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupWithRights>, AppError> {
    let group = GroupsService::get_group(state.store.as_ref(), id).await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}/matrix",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Module × action matrix", body = GroupMatrix),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn get_group_matrix(
    State(state): State<AppState>,
    _auth: RequireGroupView,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupMatrix>, AppError> {
    let matrix = GroupsService::get_matrix(state.store.as_ref(), &state.catalog, id).await?;
    Ok(Json(matrix))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created", body = GroupWithRights),
        (status = 400, description = "Unknown right code"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing GROUP_ADD or granting rights the caller lacks"),
        (status = 409, description = "Group name already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn create_group(
    State(state): State<AppState>,
    RequireGroupAdd(auth): RequireGroupAdd,
    ValidatedJson(dto): ValidatedJson<CreateGroupDto>,
) -> Result<(StatusCode, Json<GroupWithRights>), AppError> {
    let caller = auth.user_id()?;
    let group = GroupsService::create_group(state.store.as_ref(), caller, dto).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    patch,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    request_body = UpdateGroupDto,
    responses(
        (status = 200, description = "Group updated", body = Group),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Name taken or system group")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn update_group(
    State(state): State<AppState>,
    _auth: RequireGroupEdit,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGroupDto>,
) -> Result<Json<Group>, AppError> {
    let group = GroupsService::update_group(state.store.as_ref(), id, dto).await?;
    Ok(Json(group))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "System group")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn delete_group(
    State(state): State<AppState>,
    _auth: RequireGroupDelete,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    GroupsService::delete_group(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace a group's rights with exactly the codes sent
#[utoipa::path(
    put,
    path = "/api/groups/{id}/rights",
    params(("id" = Uuid, Path, description = "Group ID")),
    request_body = SaveGroupRightsDto,
    responses(
        (status = 200, description = "Rights saved", body = GroupWithRights),
        (status = 400, description = "Unknown right code, nothing changed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing GROUP_EDIT or granting rights the caller lacks"),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn save_group_rights(
    State(state): State<AppState>,
    RequireGroupEdit(auth): RequireGroupEdit,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SaveGroupRightsDto>,
) -> Result<Json<GroupWithRights>, AppError> {
    let caller = auth.user_id()?;
    let group = GroupsService::save_group_rights(state.store.as_ref(), caller, id, dto).await?;
    Ok(Json(group))
}

/// Save several groups at once; each group succeeds or fails on its own
#[utoipa::path(
    put,
    path = "/api/groups/rights",
    request_body = SaveAllGroupRightsDto,
    responses(
        (status = 200, description = "Per-group outcomes", body = SaveAllResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation error")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
pub async fn save_all_group_rights(
    State(state): State<AppState>,
    RequireGroupEdit(auth): RequireGroupEdit,
    ValidatedJson(dto): ValidatedJson<SaveAllGroupRightsDto>,
) -> Result<Json<SaveAllResponse>, AppError> {
    let caller = auth.user_id()?;
    let response = GroupsService::save_all_group_rights(state.store.as_ref(), caller, dto).await;
    Ok(Json(response))
}
