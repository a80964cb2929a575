//! # pb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the engine:
//! resolve "now", call the engine, shape the response.

use crate::error::{ApiError, PageError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use pb_core::clock::resolve_now;
use pb_core::lifecycle::PasteEngine;
use pb_core::models::to_iso8601;
use pb_core::traits::Clock;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: PasteEngine,
    pub clock: Arc<dyn Clock>,
    /// Header carrying a per-request "now" override. `None` outside test mode.
    pub time_override: Option<HeaderName>,
    /// Base for paste URLs; falls back to the request's Host header.
    pub public_base_url: Option<String>,
}

impl AppState {
    fn now(&self, headers: &HeaderMap) -> i64 {
        let override_ms = self
            .time_override
            .as_ref()
            .and_then(|name| headers.get(name))
            .and_then(|value| value.to_str().ok());
        resolve_now(self.clock.as_ref(), override_ms)
    }

    fn paste_url(&self, headers: &HeaderMap, id: &str) -> String {
        let base = match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => {
                let host = header_str(headers, HOST.as_str()).unwrap_or("localhost");
                let scheme = header_str(headers, "x-forwarded-proto").unwrap_or("http");
                format!("{scheme}://{host}")
            }
        };
        format!("{base}/p/{id}")
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[derive(Debug, Serialize)]
pub struct CreatedPaste {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PasteResponse {
    pub content: String,
    pub remaining_views: Option<u64>,
    pub expires_at: Option<String>,
}

/// `POST /api/pastes`
pub async fn create_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedPaste>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        ApiError::MalformedBody(rejection.status(), rejection.body_text())
    })?;

    let now = state.now(&headers);
    let record = state.engine.create(&body, now).await?;
    let url = state.paste_url(&headers, &record.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedPaste { id: record.id, url }),
    ))
}

/// `GET /api/pastes/{id}`: metadata and content without spending a view.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PasteResponse>, ApiError> {
    let view = state.engine.inspect(&id, state.now(&headers)).await?;

    Ok(Json(PasteResponse {
        content: view.content,
        remaining_views: view.remaining_views,
        expires_at: view.expires_at.and_then(to_iso8601),
    }))
}

/// `GET /p/{id}`: spends a view and renders the paste as HTML.
pub async fn view_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let record = state.engine.consume(&id, state.now(&headers)).await?;
    Ok(Html(pb_ui::render_paste(&record)?))
}

/// `GET /api/healthz`
pub async fn health(State(state): State<AppState>) -> Response {
    match state.engine.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false }))).into_response()
        }
    }
}

/// Anything unrouted.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
