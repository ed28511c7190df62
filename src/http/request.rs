//! Request handling.
//!
//! # Responsibilities
//! - Attach and propagate a request ID
//! - Resolve the caller context from the `Authorization` header
//! - Record per-request metrics
//!
//! # Design Decisions
//! - No header means no context; browse then serves the public view
//! - An unknown bearer token is rejected rather than treated as anonymous
//! - HTTP callers are never internal

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::time::Instant;

use crate::error::Error;
use crate::observability::metrics;
use crate::settings::types::{Actor, Context};

use super::server::AppState;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Caller context resolved for this request.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Context>);

impl Caller {
    /// Context for per-key operations; anonymous when none was supplied.
    pub fn context(&self) -> Context {
        self.0.clone().unwrap_or_else(Context::anonymous)
    }
}

/// Map the bearer token in `headers` to a context.
pub fn resolve_caller(headers: &HeaderMap, tokens: &HashMap<String, Actor>) -> Result<Caller, Error> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(Caller(None));
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| Error::PermissionDenied("Malformed Authorization header".into()))?;

    tokens
        .get(token)
        .map(|actor| Caller(Some(Context::for_actor(actor.clone()))))
        .ok_or_else(|| Error::PermissionDenied("Invalid access token".into()))
}

pub async fn caller_middleware(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    match resolve_caller(req.headers(), &state.tokens) {
        Ok(caller) => {
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), error = %e, "Rejected caller credentials");
            e.into_response()
        }
    }
}

pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let response = next.run(req).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
