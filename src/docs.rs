use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use fleetops_core::RightAction;
use fleetops_models::{
    AssignGroupDto, CreateGroupDto, CreateUserDto, Group, GroupMatrix, GroupRightsEntry,
    GroupSaveOutcome, GroupWithRights, LoginRequest, LoginResponse, MatrixCell, MatrixRow,
    ProfileResponse, Right, RightModule, SaveAllGroupRightsDto, SaveAllResponse,
    SaveGroupRightsDto, SaveStatus, UpdateGroupDto, User, UserGroupsResponse,
    UserPermissionsResponse,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_profile,
        crate::modules::rights::controller::get_rights,
        crate::modules::rights::controller::get_right_modules,
        crate::modules::groups::controller::get_groups,
        crate::modules::groups::controller::get_group,
        crate::modules::groups::controller::get_group_matrix,
        crate::modules::groups::controller::create_group,
        crate::modules::groups::controller::update_group,
        crate::modules::groups::controller::delete_group,
        crate::modules::groups::controller::save_group_rights,
        crate::modules::groups::controller::save_all_group_rights,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user_groups,
        crate::modules::users::controller::add_user_to_group,
        crate::modules::users::controller::remove_user_from_group,
        crate::modules::users::controller::get_user_permissions,
    ),
    components(
        schemas(
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            User,
            CreateUserDto,
            AssignGroupDto,
            UserGroupsResponse,
            UserPermissionsResponse,
            Right,
            RightModule,
            RightAction,
            Group,
            GroupWithRights,
            CreateGroupDto,
            UpdateGroupDto,
            SaveGroupRightsDto,
            GroupRightsEntry,
            SaveAllGroupRightsDto,
            SaveAllResponse,
            GroupSaveOutcome,
            SaveStatus,
            GroupMatrix,
            MatrixRow,
            MatrixCell,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and the caller's profile"),
        (name = "Rights", description = "The right catalog"),
        (name = "Groups", description = "Permission groups and their rights"),
        (name = "Users", description = "User accounts and group membership")
    ),
    info(
        title = "FleetOps API",
        version = "0.1.0",
        description = "Permission administration for the FleetOps fleet management back office.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_group_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/groups/{id}/rights"));
        assert!(doc.paths.paths.contains_key("/api/groups/rights"));
        assert!(doc.paths.paths.contains_key("/api/users/{user_id}/permissions"));
    }
}
