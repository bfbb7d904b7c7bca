use axum::{Router, routing::get};

use super::controller::{get_right_modules, get_rights};
use crate::state::AppState;

pub fn init_rights_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_rights))
        .route("/modules", get(get_right_modules))
}
