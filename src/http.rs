//! HTTP transport for career-predictor
//!
//! Axum router exposing the prediction and chat relays. CORS sits outside the
//! auth and metrics layers so an OPTIONS preflight never reaches them or the
//! handlers. Health and metrics are plain JSON.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderName, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::{cmp::Ordering, collections::HashMap, sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::{ErrorKind, PredictionError};
use crate::models::{ChatReply, ChatRequest, PredictionResult, Profile};
use crate::predictor::RecommendationProxy;

/// Latency samples kept for avg/p95
const LATENCY_WINDOW: usize = 256;

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub proxy: Arc<RecommendationProxy>,
    pub metrics: Arc<Mutex<HttpMetrics>>,
    pub max_body_bytes: usize,
}

impl HttpState {
    pub fn new(proxy: RecommendationProxy, max_body_bytes: usize) -> Self {
        Self {
            proxy: Arc::new(proxy),
            metrics: Arc::new(Mutex::new(HttpMetrics::new())),
            max_body_bytes,
        }
    }
}

/// Metrics for HTTP server
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    pub total_requests: u64,
    pub last_request_unix: u64,
    pub errors_total: u64,
    pub latencies: Vec<f64>, // ring buffer for p95
    pub errors_by_kind: HashMap<&'static str, u64>,
}

impl HttpMetrics {
    fn new() -> Self {
        Self {
            total_requests: 0,
            last_request_unix: unix_now(),
            errors_total: 0,
            latencies: Vec::with_capacity(LATENCY_WINDOW),
            errors_by_kind: HashMap::new(),
        }
    }

    fn record(&mut self, latency_ms: f64, status: StatusCode, kind: Option<&'static str>) {
        if latency_ms > 0.0 {
            self.latencies.push(latency_ms);
            if self.latencies.len() > LATENCY_WINDOW {
                self.latencies.remove(0);
            }
        }
        if !status.is_success() {
            self.errors_total = self.errors_total.saturating_add(1);
        }
        if let Some(kind) = kind {
            *self.errors_by_kind.entry(kind).or_insert(0) += 1;
        }
        self.total_requests = self.total_requests.saturating_add(1);
        self.last_request_unix = unix_now();
    }

    /// (avg, p95) in milliseconds
    fn latency_stats(&self) -> (Option<f64>, Option<f64>) {
        if self.latencies.is_empty() {
            return (None, None);
        }
        let sum: f64 = self.latencies.iter().sum();
        let avg = sum / self.latencies.len() as f64;
        let mut sorted = self.latencies.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let p95_idx = ((sorted.len() as f64 * 0.95) as usize).min(sorted.len() - 1);
        (Some(avg), sorted.get(p95_idx).copied())
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Metrics endpoint
pub async fn metrics_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let metrics = state.metrics.lock().await.clone();
    let (avg_latency_ms, p95_latency_ms) = metrics.latency_stats();
    Json(json!({
        "metrics_version": "1",
        "total_requests": metrics.total_requests,
        "last_request_unix": metrics.last_request_unix,
        "errors_total": metrics.errors_total,
        "errors_by_kind": metrics.errors_by_kind,
        "avg_latency_ms": avg_latency_ms,
        "p95_latency_ms": p95_latency_ms
    }))
}

/// POST /predict-career
pub async fn predict_handler(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<PredictionResult>, PredictionError> {
    if body.is_empty() {
        return Err(PredictionError::invalid_request("Empty body"));
    }
    let profile = Profile::from_request_body(&body)?;
    profile
        .validate()
        .map_err(|issues| PredictionError::invalid_request(issues.join(", ")))?;

    let result = state.proxy.predict(&profile).await.inspect_err(|e| {
        tracing::error!(kind = e.kind(), "Error in predict-career: {}", e);
    })?;
    Ok(Json(result))
}

/// POST /ai-chat
pub async fn chat_handler(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<ChatReply>, PredictionError> {
    if body.is_empty() {
        return Err(PredictionError::invalid_request("Empty body"));
    }
    let req: ChatRequest = serde_json::from_slice(&body)?;
    let message = state.proxy.chat(&req.messages).await.inspect_err(|e| {
        tracing::error!(kind = e.kind(), "Error in ai-chat: {}", e);
    })?;
    Ok(Json(ChatReply { message }))
}

async fn track_metrics(
    State(metrics): State<Arc<Mutex<HttpMetrics>>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let resp = next.run(req).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let kind = resp.extensions().get::<ErrorKind>().map(|k| k.0);
    metrics.lock().await.record(latency_ms, resp.status(), kind);
    resp
}

async fn require_bearer(
    State(token): State<Option<Arc<str>>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = token else {
        return next.run(req).await;
    };
    if req.uri().path() == "/health" || req.method() == Method::OPTIONS {
        return next.run(req).await;
    }
    let header_ok = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v == &*expected)
        .unwrap_or(false);
    if !header_ok {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response();
    }
    next.run(req).await
}

/// Permissive CORS matching what the browser client sends
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
        .max_age(std::time::Duration::from_secs(86400))
}

/// Build the application router
pub fn build_router(state: HttpState, bearer_token: Option<String>) -> Router {
    let token: Option<Arc<str>> = bearer_token.map(Arc::from);
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/predict-career", post(predict_handler))
        .route("/ai-chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(middleware::from_fn_with_state(token, require_bearer))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_metrics,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(config: &Config) -> anyhow::Result<()> {
    if config.runtime.bearer_token.is_none() {
        tracing::warn!("CAREER_BEARER_TOKEN is not set; routes are open to any caller");
    }
    if std::env::var(&config.upstream.api_key_env).is_err() {
        tracing::warn!(
            "{} is not set; prediction requests will fail until it is",
            config.upstream.api_key_env
        );
    }

    let proxy = RecommendationProxy::from_config(&config.upstream)
        .map_err(|e| anyhow::anyhow!("Failed to build upstream client: {}", e))?;
    let state = HttpState::new(proxy, config.server.max_body_bytes);
    let app = build_router(state, config.runtime.bearer_token.clone());

    let listener = tokio::net::TcpListener::bind(config.server.http_bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", config.server.http_bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
