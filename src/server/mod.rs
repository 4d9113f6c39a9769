// src/server/mod.rs

//! HTTP surface: resolve endpoint and media proxy.

mod proxy;
mod resolve;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::Resolver;
use crate::utils::http::{ReqwestClient, create_media_client};

pub use proxy::{download_handler, preflight_handler, proxy_handler};
pub use resolve::resolve_handler;

/// Returned when the `url` query parameter is absent or blank.
pub const MSG_MISSING_URL: &str = "缺少 URL 参数";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    /// Streaming client for the proxy; no total timeout
    pub media: reqwest::Client,
}

impl AppState {
    pub fn new(resolver: Resolver, media: reqwest::Client) -> Self {
        Self {
            resolver: Arc::new(resolver),
            media,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(ReqwestClient::new(&config.http)?);
        let resolver = Resolver::from_config(config, client);
        Ok(Self::new(resolver, create_media_client(&config.http)?))
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // The proxy routes set their own CORS headers so preflight reaches the handler.
    let api: Router<AppState> = Router::new()
        .route("/resolve", get(resolve_handler))
        .route("/api/resolve", get(resolve_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let media: Router<AppState> = Router::new()
        .route("/proxy", get(proxy_handler).options(preflight_handler))
        .route("/api/proxy", get(proxy_handler).options(preflight_handler))
        .route("/download", get(download_handler).options(preflight_handler));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(api)
        .merge(media)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let addr = config.server.addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Share resolver listening on http://{addr}");
    log::info!(
        "Strategies: {}",
        state.resolver.strategy_names().join(" -> ")
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, Response};
    use tower::ServiceExt;

    use super::*;
    use crate::utils::http::mock::MockHttpClient;

    /// State backed by a canned-response client and a proxy-free media client.
    pub fn state_with(mock: MockHttpClient) -> AppState {
        let resolver = Resolver::from_config(&Config::default(), Arc::new(mock));
        let media = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test media client");
        AppState::new(resolver, media)
    }

    pub async fn send(state: AppState, method: Method, uri: &str) -> Response<Body> {
        send_request(
            state,
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_request(state: AppState, request: Request<Body>) -> Response<Body> {
        router(state).oneshot(request).await.unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
