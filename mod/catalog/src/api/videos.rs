use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use vidgate_core::{ListParams, ServiceError};

use crate::api::CatalogState;
use crate::model::CreateVideo;

pub fn routes() -> Router<CatalogState> {
    Router::new()
        .route("/videos", get(list_videos).post(add_video))
        .route(
            "/videos/{id}",
            get(get_video).put(update_video).delete(delete_video),
        )
}

#[derive(serde::Deserialize)]
struct VideoListQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
}

async fn list_videos(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.authenticator.check(&headers, "catalog:videos:read")?;

    let defaults = ListParams::default();
    let params = ListParams {
        limit: query.limit.unwrap_or(defaults.limit),
        offset: query.offset.unwrap_or(0),
        q: query.q,
    };
    let result = state
        .service
        .list_videos(&params, query.category.as_deref())
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_video(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.authenticator.check(&headers, "catalog:videos:read")?;

    let video = state.service.get_video(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(video).unwrap()))
}

async fn add_video(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Json(input): Json<CreateVideo>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    state.authenticator.check(&headers, "catalog:videos:write")?;

    let video = state.service.add_video(input).map_err(ServiceError::from)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::to_value(video).unwrap()),
    ))
}

async fn update_video(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.authenticator.check(&headers, "catalog:videos:write")?;

    let video = state
        .service
        .update_video(&id, patch)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(video).unwrap()))
}

async fn delete_video(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ServiceError> {
    state.authenticator.check(&headers, "catalog:videos:write")?;

    state.service.delete_video(&id).map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
