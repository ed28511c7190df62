//! HTTP surface, wired with the bundled engine, store and site router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use site_settings::config::{ServiceConfig, TokenConfig};
use site_settings::http::{AppState, HttpServer, X_REQUEST_ID};
use site_settings::lifecycle::build_api;

async fn app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.content.path = dir.path().to_path_buf();
    config.auth.tokens = vec![
        TokenConfig { token: "owner-token".into(), actor: "owner".into(), roles: vec!["Owner".into()] },
        TokenConfig { token: "editor-token".into(), actor: "editor".into(), roles: vec!["Editor".into()] },
    ];

    let api = Arc::new(build_api(&config).await.unwrap());
    let router = HttpServer::build_router(&config, AppState::new(api, &config));
    (router, dir)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if method == "PUT" {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    builder.body(body).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_anonymous_browse_is_public() {
    let (app, _dir) = app().await;
    let response = app.oneshot(request("GET", "/settings", None, Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(X_REQUEST_ID));

    let body = json_body(response).await;
    let settings = body["settings"].as_array().unwrap();
    assert!(settings.iter().all(|s| s["type"] == "blog"));
    assert!(settings.iter().all(|s| s["key"] != "permalinks"));
    assert!(body["meta"].get("filters").is_none());
}

#[tokio::test]
async fn test_anonymous_browse_with_theme_filter() {
    let (app, _dir) = app().await;
    let response = app
        .oneshot(request("GET", "/settings?type=theme", None, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["settings"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["filters"]["type"], "theme");
}

#[tokio::test]
async fn test_browse_with_type_query() {
    let (app, _dir) = app().await;
    let response = app
        .oneshot(request("GET", "/settings?type=theme", Some("editor-token"), Body::empty()))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["settings"].as_array().unwrap().len(), 1);
    assert_eq!(body["settings"][0]["key"], "active_theme");
}

#[tokio::test]
async fn test_error_kinds_map_to_statuses() {
    let (app, _dir) = app().await;

    let core = app
        .clone()
        .oneshot(request("GET", "/settings/db_hash", Some("owner-token"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(core.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(core).await["errors"][0]["type"], "NoPermissionError");

    let hidden = app
        .clone()
        .oneshot(request("GET", "/settings/permalinks", Some("owner-token"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

    let theme = app
        .clone()
        .oneshot(request(
            "PUT",
            "/settings",
            Some("owner-token"),
            Body::from(json!({"key": "active_theme", "value": "other"}).to_string()),
        ))
        .await
        .unwrap();
    assert_eq!(theme.status(), StatusCode::BAD_REQUEST);

    let bad_token = app.oneshot(request("GET", "/settings", Some("nope"), Body::empty())).await.unwrap();
    assert_eq!(bad_token.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_edit_and_read_back() {
    let (app, _dir) = app().await;
    let edit = Request::builder()
        .method("PUT")
        .uri("/settings")
        .header(header::AUTHORIZATION, "Bearer owner-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"settings": [{"key": "title", "value": "From HTTP"}]}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(edit).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let read = app
        .oneshot(request("GET", "/settings/title", None, Body::empty()))
        .await
        .unwrap();
    assert_eq!(json_body(read).await["settings"][0]["value"], "From HTTP");
}

#[tokio::test]
async fn test_editor_cannot_edit() {
    let (app, _dir) = app().await;
    let edit = Request::builder()
        .method("PUT")
        .uri("/settings")
        .header(header::AUTHORIZATION, "Bearer editor-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"key": "title", "value": "Nope"}).to_string()))
        .unwrap();
    let response = app.oneshot(edit).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_routes_upload_download_and_rollback() {
    let (app, dir) = app().await;

    let empty = app
        .clone()
        .oneshot(request("GET", "/settings/routes/yaml", Some("editor-token"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::OK);
    assert_eq!(text_body(empty).await, "");

    let good = "routes:\n  /about/: about\n";
    let upload = app
        .clone()
        .oneshot(request("POST", "/settings/routes/yaml", Some("owner-token"), Body::from(good)))
        .await
        .unwrap();
    assert_eq!(upload.status(), StatusCode::NO_CONTENT);

    let denied = app
        .clone()
        .oneshot(request("POST", "/settings/routes/yaml", Some("editor-token"), Body::from(good)))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    // Unparseable YAML fails the reload and is rolled back.
    let broken = app
        .clone()
        .oneshot(request("POST", "/settings/routes/yaml", Some("owner-token"), Body::from("routes: [")))
        .await
        .unwrap();
    assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let current = app
        .oneshot(request("GET", "/settings/routes/yaml", Some("owner-token"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(text_body(current).await, good);

    // Staging files never linger next to the artifact.
    let mut entries = tokio::fs::read_dir(dir.path().join("settings")).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        assert!(!entry.file_name().to_string_lossy().starts_with(".routes-upload-"));
    }
}
