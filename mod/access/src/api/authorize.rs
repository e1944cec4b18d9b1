use axum::extract::{Extension, Path, State};
use axum::routing::get;
use axum::{Json, Router};

use vidgate_core::ServiceError;

use crate::api::{AppState, CurrentIdentity};
use crate::service::authorizer::{AccessTarget, AuthzState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/authorize/{target}", get(authorize))
}

/// GET /access/authorize/{target} — evaluate a navigation target for the
/// caller. Anonymous callers are allowed; in role-based mode they get the
/// login redirect.
async fn authorize(
    State(svc): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(target): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let target: AccessTarget = target.parse().map_err(ServiceError::Validation)?;
    let identity_id = current.0.as_ref().map(|i| i.id.as_str());

    let state = svc
        .authorize(target, identity_id)
        .map_err(ServiceError::from)?;

    let body = match state {
        AuthzState::Pending => serde_json::json!({"target": target, "state": "pending"}),
        AuthzState::Authorized => serde_json::json!({"target": target, "state": "authorized"}),
        AuthzState::Denied(denial) => serde_json::json!({
            "target": target,
            "state": "denied",
            "redirect": denial,
        }),
    };
    Ok(Json(body))
}
