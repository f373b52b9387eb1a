use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use authgate_auth::prelude::AuthDecisionEvent;
use authgate_errors::mapping_http::to_http_status;
use authgate_errors::prelude::{codes, ErrorBuilder};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::host::{AuthGate, TokenAuthorizerEvent};

const REQUEST_ID_HEADER: &str = "x-request-id";
const DENIED: &str = "Unauthorized";

#[derive(Clone)]
pub struct ServeState {
    pub gate: Arc<AuthGate>,
}

impl ServeState {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}

pub fn build_router(state: ServeState) -> Router {
    Router::new()
        .route("/authorize", post(authorize_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
}

async fn authorize_handler(
    State(state): State<ServeState>,
    headers: HeaderMap,
    body: Result<Json<TokenAuthorizerEvent>, JsonRejection>,
) -> Response {
    let correlation_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let event = match body {
        Ok(Json(event)) => event,
        Err(rejection) => {
            let reason = rejection.body_text();
            warn!(%correlation_id, status = %rejection.status(), %reason, "unreadable authorizer event");
            state.gate.authorizer.sink.record(&AuthDecisionEvent {
                correlation_id: Some(correlation_id),
                resource: String::new(),
                allow: false,
                principal_id: None,
                code: Some(codes::TOKEN_MALFORMED.0.to_string()),
                reason: Some(reason),
                elapsed_ms: 0,
            });
            return unauthorized(DENIED);
        }
    };

    match state.gate.handle_event(&event, Some(&correlation_id)).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(denied) => unauthorized(&denied.to_string()),
    }
}

fn unauthorized(message: &str) -> Response {
    let status = to_http_status(&ErrorBuilder::new(codes::AUTH_UNAUTHENTICATED).build());
    (status, Json(json!({ "message": message }))).into_response()
}

async fn health_handler(State(state): State<ServeState>) -> Json<Value> {
    let stats = state.gate.keys.metrics().snapshot();
    Json(json!({
        "status": "ok",
        "cached_keys": state.gate.keys.cached_entries().len(),
        "key_cache": {
            "hits": stats.hits,
            "misses": stats.misses,
            "fetches": stats.fetches,
            "fetch_failures": stats.fetch_failures,
        },
    }))
}

pub async fn serve(state: ServeState, bind: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let local = listener.local_addr().context("listener address")?;
    info!(addr = %local, "authorizer listening");

    axum::serve(listener, build_router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("authorizer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
