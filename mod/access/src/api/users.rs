use axum::extract::{Extension, Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use vidgate_core::{ListParams, ServiceError};

use crate::api::middleware::require_identity;
use crate::api::{AppState, CurrentIdentity};
use crate::model::Role;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/delete", post(delete_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/role", put(set_role))
        .route("/users/{id}/discord", put(set_discord_id))
}

async fn list_users(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let result = svc.list_users(&params).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_user(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let user = svc.get_user(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}

#[derive(serde::Deserialize)]
struct SetRoleRequest {
    role: Role,
}

async fn set_role(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let user = svc.set_role(&id, body.role).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}

#[derive(serde::Deserialize)]
struct SetDiscordRequest {
    #[serde(default)]
    discord_id: Option<String>,
}

async fn set_discord_id(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
    Json(body): Json<SetDiscordRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let user = svc
        .set_discord_id(&id, body.discord_id.as_deref())
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}

#[derive(serde::Deserialize)]
struct DeleteUsersRequest {
    user_ids: Vec<String>,
}

/// POST /access/users/delete — delete user records as one atomic batch.
/// The corresponding identity-provider accounts are left alone.
async fn delete_users(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(body): Json<DeleteUsersRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let deleted = svc
        .delete_users(&body.user_ids)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
