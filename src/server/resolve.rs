// src/server/resolve.rs

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::{AppState, MSG_MISSING_URL};
use crate::models::{ApiResponse, ContentItem};

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    /// Share text or link
    pub url: Option<String>,
}

/// `GET /resolve?url=...`
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> (StatusCode, Json<ApiResponse<ContentItem>>) {
    let Some(text) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(MSG_MISSING_URL)));
    };

    match state.resolver.resolve(&text).await {
        Ok(resolution) => (StatusCode::OK, Json(ApiResponse::ok(resolution.item))),
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            log::warn!("Resolve failed ({}): {e}", status.as_u16());
            (status, Json(ApiResponse::err(e.user_message())))
        }
    }
}
