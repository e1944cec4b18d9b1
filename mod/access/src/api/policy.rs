use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};

use vidgate_core::ServiceError;

use crate::api::middleware::require_identity;
use crate::api::{AppState, CurrentIdentity};
use crate::model::Role;

pub fn routes() -> Router<AppState> {
    Router::new().route("/default-role", get(get_default_role).put(set_default_role))
}

async fn get_default_role(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let policy = svc.default_role_policy().map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(policy).unwrap()))
}

#[derive(serde::Deserialize)]
struct SetDefaultRoleRequest {
    role: Role,
}

async fn set_default_role(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(body): Json<SetDefaultRoleRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let policy = svc.set_default_role(body.role).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(policy).unwrap()))
}
