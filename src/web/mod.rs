// src/web/mod.rs
// HTTP surface: routes, middleware stack and server startup

pub mod api;
pub mod error;
pub mod middleware;
pub mod page;
pub mod state;

use std::net::SocketAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::web::middleware::REQUEST_ID_HEADER;
use crate::web::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let settings = &state.settings;
    let body_limit = settings.max_upload_bytes() as usize + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(api::index))
        .route("/favicon.ico", get(api::favicon))
        .route("/healthz", get(api::healthz))
        .route("/classify-text", post(api::classify_text))
        .route("/classify-file", post(api::classify_file))
        .layer(axum::middleware::from_fn_with_state(
            settings.request_timeout,
            middleware::request_timeout,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&settings.allowed_origins))
        .layer(TraceLayer::new_for_http())
        // Outermost, so every response (timeouts included) carries the id
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}

/// CORS for the configured origins; an empty list allows no cross-origin access
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([REQUEST_ID_HEADER])
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Triage service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
