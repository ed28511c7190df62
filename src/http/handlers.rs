use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::settings::{BrowseOptions, EditRequest, SettingsResult};

use super::request::Caller;
use super::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    #[serde(rename = "type")]
    pub class: Option<String>,
}

pub async fn browse_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<SettingsResult>> {
    let options = BrowseOptions { class_filter: query.class, context: caller.0 };
    Ok(Json(state.api.browse(&options).await?))
}

pub async fn read_setting(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(key): Path<String>,
) -> Result<Json<SettingsResult>> {
    Ok(Json(state.api.read(&key, &caller.context()).await?))
}

pub async fn edit_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<EditRequest>,
) -> Result<Json<SettingsResult>> {
    Ok(Json(state.api.edit(request, &caller.context()).await?))
}

pub async fn download_routes(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse> {
    let contents = state.api.download(&caller.context()).await?.unwrap_or_default();
    Ok(([(header::CONTENT_TYPE, "application/yaml")], contents))
}

/// Stage the body next to the artifact, run the upload, then drop the staging file.
pub async fn upload_routes(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<StatusCode> {
    let dir = state.api.routes().artifact().dir().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;
    let staging = dir.join(format!(".routes-upload-{}.yaml", Uuid::new_v4()));
    tokio::fs::write(&staging, &body).await?;

    let outcome = state.api.upload(&staging, &caller.context()).await;

    if let Err(e) = tokio::fs::remove_file(&staging).await {
        tracing::warn!(path = %staging.display(), error = %e, "Failed to remove upload staging file");
    }

    outcome.map(|()| StatusCode::NO_CONTENT)
}
