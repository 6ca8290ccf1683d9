//! Request routing over the resolution engine.
//!
//! The resolution endpoints answer with a redirect to the resolved media
//! link; `/api/init` and `/api/progress` relay the job backend's raw
//! payloads for callers driving a conversion themselves.

use axum::extract::{Query, State};
use axum::response::{Json, Redirect};
use axum::routing::get;
use axum::Router;
use providers_resolver::resolver::FORMAT_VIDEO_360;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/api/song", get(resolve_audio))
        .route("/api/mp3", get(resolve_audio))
        .route("/api/ytmp3", get(resolve_audio))
        .route("/api/ytmp4", get(resolve_video))
        .route("/api/init", get(submit_job))
        .route("/api/progress", get(job_progress))
}

#[derive(Debug, Deserialize)]
struct UrlQuery {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobQuery {
    format: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProgressQuery {
    id: Option<String>,
}

async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/song?url={video_url}",
            "/api/mp3?url={video_url}",
            "/api/ytmp3?url={video_url}",
            "/api/ytmp4?url={video_url}",
            "/api/init?format={format}&url={video_url}",
            "/api/progress?id={job_id}",
        ],
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "alive",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn resolve_audio(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> ApiResult<Redirect> {
    let input = query.url.unwrap_or_default();
    let link = state.resolver.resolve_audio(&input).await?;
    Ok(Redirect::temporary(&link))
}

async fn resolve_video(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> ApiResult<Redirect> {
    let input = query.url.unwrap_or_default();
    let link = state.resolver.resolve_video(&input, FORMAT_VIDEO_360).await?;
    Ok(Redirect::temporary(&link))
}

async fn submit_job(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let format = query
        .format
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing format parameter"))?;
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing url parameter"))?;

    let payload = state
        .resolver
        .submit_conversion_job(&format, &url)
        .await
        .map_err(|err| ApiError::bad_gateway(err.to_string()))?;
    Ok(Json(payload))
}

async fn job_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = query
        .id
        .filter(|i| !i.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing id parameter"))?;

    let payload = state
        .resolver
        .poll_conversion_job(&id)
        .await
        .map_err(|err| ApiError::bad_gateway(err.to_string()))?;
    Ok(Json(payload))
}
