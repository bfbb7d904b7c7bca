use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{
    create_group, delete_group, get_group, get_group_matrix, get_groups, save_all_group_rights,
    save_group_rights, update_group,
};
use crate::state::AppState;

pub fn init_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_groups).post(create_group))
        .route("/rights", put(save_all_group_rights))
        .route(
            "/{id}",
            get(get_group).patch(update_group).delete(delete_group),
        )
        .route("/{id}/matrix", get(get_group_matrix))
        .route("/{id}/rights", put(save_group_rights))
}
