use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use vidgate_core::ServiceError;

use crate::api::CatalogState;

pub fn routes() -> Router<CatalogState> {
    Router::new()
        .route("/categories", get(list_categories).post(add_category))
        .route("/categories/{name}", axum::routing::delete(remove_category))
}

async fn list_categories(
    State(state): State<CatalogState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state
        .authenticator
        .check(&headers, "catalog:categories:read")?;

    let categories = state
        .service
        .list_categories()
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "items": categories })))
}

#[derive(serde::Deserialize)]
struct AddCategoryRequest {
    name: String,
}

async fn add_category(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Json(body): Json<AddCategoryRequest>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    state
        .authenticator
        .check(&headers, "catalog:categories:write")?;

    let category = state
        .service
        .add_category(&body.name)
        .map_err(ServiceError::from)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::to_value(category).unwrap()),
    ))
}

async fn remove_category(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<axum::http::StatusCode, ServiceError> {
    state
        .authenticator
        .check(&headers, "catalog:categories:write")?;

    state
        .service
        .remove_category(&name)
        .map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
