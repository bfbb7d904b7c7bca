use axum::{
    Json,
    extract::{Query, State},
};

use fleetops_core::AppError;
use fleetops_models::{Right, RightFilterParams, RightModule};

use super::service::RightsService;
use crate::middleware::auth::RequireGroupView;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/rights",
    params(
        (
            "module" = Option<String>,
            Query,
            description = "Only rights of this module, e.g. TRUCK_MAINTENANCE"
        )
    ),
    responses(
        (status = 200, description = "Rights", body = Vec<Right>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Rights",
    security(("bearer_auth" = []))
)]
pub async fn get_rights(
    State(state): State<AppState>,
    _auth: RequireGroupView,
    Query(params): Query<RightFilterParams>,
) -> Result<Json<Vec<Right>>, AppError> {
    let rights = RightsService::list_rights(state.store.as_ref(), params.module.as_deref()).await?;
    Ok(Json(rights))
}

#[utoipa::path(
    get,
    path = "/api/rights/modules",
    responses(
        (status = 200, description = "Rights grouped by module", body = Vec<RightModule>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Rights",
    security(("bearer_auth" = []))
)]
pub async fn get_right_modules(
    State(state): State<AppState>,
    _auth: RequireGroupView,
) -> Result<Json<Vec<RightModule>>, AppError> {
    let modules = RightsService::list_modules(state.store.as_ref()).await?;
    Ok(Json(modules))
}
