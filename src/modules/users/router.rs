use axum::{
    Router,
    routing::{delete, get, post},
};

use super::controller::{
    add_user_to_group, create_user, get_user_groups, get_user_permissions, remove_user_from_group,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route(
            "/{user_id}/groups",
            get(get_user_groups).post(add_user_to_group),
        )
        .route(
            "/{user_id}/groups/{group_id}",
            delete(remove_user_from_group),
        )
        .route("/{user_id}/permissions", get(get_user_permissions))
}
