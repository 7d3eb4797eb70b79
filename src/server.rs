//! HTTP front door: routing, middleware, and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::fulfillment::WebhookRequest;
use crate::intents::{self, Intent};
use crate::upstream::UpstreamClient;

/// Shared application state. Handlers share nothing mutable; the upstream
/// client is the only dependency they need.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health).post(fulfill))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// "Hello World" endpoint; lets you verify the tunnel end to end from a
/// browser.
async fn health() -> Response {
    (StatusCode::OK, Json(json!({ "msg": "Express Server Works!" }))).into_response()
}

/// The fulfillment endpoint DialogFlow POSTs to.
async fn fulfill(State(state): State<AppState>, Json(request): Json<WebhookRequest>) -> Response {
    let name = &request.query_result.intent.display_name;

    match Intent::from_display_name(name) {
        Some(intent) => {
            info!("Fulfilling intent {}", name);
            let response =
                intents::handle(intent, &state.upstream, &request.query_result.parameters).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        None => {
            error!("Could not find {} in intent map!", name);
            (StatusCode::NOT_FOUND, Json(json!({ "msg": "Not found!" }))).into_response()
        }
    }
}

/// Tags every response with an X-Request-Id header for log correlation.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Binds the listener and serves until CTRL+C or SIGTERM.
pub async fn run(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(
        "DialogFlow fulfillment handler listening on port {}. Expose it with an external ngrok process.",
        port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, shutting down");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
