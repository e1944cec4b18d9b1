use axum::extract::{Extension, Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use vidgate_core::ServiceError;

use crate::api::middleware::require_identity;
use crate::api::{AppState, CurrentIdentity};
use crate::model::GateScope;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gate/{scope}", get(status))
        .route("/gate/{scope}/check", post(check))
        .route("/gate/{scope}/password", put(set_password))
}

fn parse_scope(raw: &str) -> Result<GateScope, ServiceError> {
    raw.parse().map_err(ServiceError::Validation)
}

/// GET /access/gate/{scope} — whether this session has the scope unlocked.
async fn status(
    State(svc): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let scope = parse_scope(&scope)?;
    Ok(Json(serde_json::json!({
        "scope": scope,
        "unlocked": svc.gate().is_unlocked(scope),
    })))
}

#[derive(serde::Deserialize)]
struct CheckRequest {
    value: String,
}

/// POST /access/gate/{scope}/check — compare against the stored password
/// and unlock the scope on match.
async fn check(
    State(svc): State<AppState>,
    Path(scope): Path<String>,
    Json(body): Json<CheckRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let scope = parse_scope(&scope)?;
    let unlocked = svc
        .check_gate(scope, &body.value)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "scope": scope,
        "unlocked": unlocked,
    })))
}

#[derive(serde::Deserialize)]
struct SetPasswordRequest {
    value: String,
}

/// PUT /access/gate/{scope}/password — overwrite the stored gate password.
async fn set_password(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(scope): Path<String>,
    Json(body): Json<SetPasswordRequest>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let caller = require_identity(&current)?;
    svc.require_admin(&caller.id).map_err(ServiceError::from)?;

    let scope = parse_scope(&scope)?;
    svc.set_gate_password(scope, &body.value)
        .map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
