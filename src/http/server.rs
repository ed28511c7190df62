//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, caller)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use axum::{
    middleware,
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::lifecycle::shutdown;
use crate::settings::{Actor, SettingsApi};

use super::handlers::*;
use super::request::{caller_middleware, metrics_middleware};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<SettingsApi>,
    /// Bearer token → actor.
    pub tokens: Arc<HashMap<String, Actor>>,
}

impl AppState {
    pub fn new(api: Arc<SettingsApi>, config: &ServiceConfig) -> Self {
        let tokens: HashMap<String, Actor> = config
            .auth
            .tokens
            .iter()
            .map(|t| (t.token.clone(), Actor { id: t.actor.clone(), roles: t.roles.clone() }))
            .collect();
        Self { api, tokens: Arc::new(tokens) }
    }
}

/// HTTP server for the settings API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, api: Arc<SettingsApi>) -> Self {
        let state = AppState::new(api, config);
        Self { router: Self::build_router(config, state) }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/settings", get(browse_settings).put(edit_settings))
            .route("/settings/routes/yaml", get(download_routes).post(upload_routes))
            .route("/settings/{key}", get(read_setting))
            .layer(middleware::from_fn_with_state(state.clone(), caller_middleware))
            .with_state(state)
            .layer(middleware::from_fn(metrics_middleware))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until the shutdown broadcast fires.
    pub async fn run(self, listener: TcpListener, shutdown_rx: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
