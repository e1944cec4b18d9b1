use axum::extract::{Extension, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use vidgate_core::ServiceError;

use crate::api::middleware::require_identity;
use crate::api::{AppState, CurrentIdentity};
use crate::model::RegisterRequest;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/reset", post(reset))
        .route("/me", get(me))
}

/// POST /access/register — create an account and its user record.
async fn register(
    State(svc): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    let registration = svc.register(input).map_err(ServiceError::from)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::to_value(registration).unwrap()),
    ))
}

#[derive(serde::Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// POST /access/login — authenticate and resolve the caller's role.
async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (issued, role) = svc
        .login(&body.email, &body.password)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "token": issued.token,
        "identity": issued.identity,
        "role": role,
    })))
}

#[derive(serde::Deserialize)]
struct ResetRequest {
    email: String,
}

/// POST /access/reset — ask the provider to send a reset message.
async fn reset(
    State(svc): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> Result<axum::http::StatusCode, ServiceError> {
    svc.reset_password(&body.email).map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// GET /access/me — the caller's identity and resolved role.
async fn me(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let identity = require_identity(&current)?;
    let role = svc.resolve_role(&identity.id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "identity": identity,
        "role": role,
    })))
}
