#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use career_predictor::{
    Credentials, RecommendationProxy,
    clients::GatewayClient,
    config::UpstreamConfig,
    http::{HttpState, build_router},
};
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

/// Scripted chat-completion provider listening on an ephemeral port
pub struct StubUpstream {
    pub base_url: String,
    state: Arc<StubState>,
}

struct StubState {
    status: u16,
    body: Value,
    delay: Duration,
    hits: AtomicUsize,
    last: Mutex<Option<(Option<String>, Value)>>,
}

impl StubUpstream {
    /// Reply 200 with `content` as the assistant message
    pub async fn replying(content: &str) -> Self {
        Self::spawn(200, completion(content), Duration::ZERO).await
    }

    pub async fn failing(status: u16) -> Self {
        Self::spawn(status, json!({"error": {"message": "upstream says no"}}), Duration::ZERO).await
    }

    pub async fn slow(content: &str, delay: Duration) -> Self {
        Self::spawn(200, completion(content), delay).await
    }

    pub async fn spawn(status: u16, body: Value, delay: Duration) -> Self {
        let state = Arc::new(StubState {
            status,
            body,
            delay,
            hits: AtomicUsize::new(0),
            last: Mutex::new(None),
        });
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}/v1"),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// (Authorization header, JSON body) of the most recent call
    pub fn last_request(&self) -> Option<(Option<String>, Value)> {
        self.state.last.lock().unwrap().clone()
    }
}

async fn completions(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    *state.last.lock().unwrap() = Some((auth, body));
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (
        StatusCode::from_u16(state.status).unwrap(),
        Json(state.body.clone()),
    )
}

/// In-memory log sink installed as the thread's default subscriber
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

pub fn upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        ..UpstreamConfig::default()
    }
}

pub fn app_with(cfg: &UpstreamConfig, credentials: Credentials, bearer: Option<&str>) -> Router {
    let client = GatewayClient::new(cfg).unwrap();
    let proxy = RecommendationProxy::new(Arc::new(client), credentials)
        .with_temperature(cfg.temperature)
        .with_strict_validation(cfg.strict_validation);
    build_router(HttpState::new(proxy, 64 * 1024), bearer.map(str::to_string))
}

/// Router against `upstream` with a fixed test credential and no bearer gate
pub fn app(upstream: &StubUpstream) -> Router {
    app_with(
        &upstream_config(&upstream.base_url),
        Credentials::Fixed(Some("sk-test".to_string())),
        None,
    )
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn ava() -> Value {
    json!({
        "fullName": "Ava",
        "age": "20",
        "educationLevel": "bachelors",
        "interests": ["technology"],
        "skills": ["coding"],
        "personalityType": "analytical",
        "hobbies": [],
        "careerGoals": ""
    })
}

pub fn three_careers() -> Value {
    let career = |name: &str, score: i64, kind: &str| {
        json!({
            "careerName": name,
            "matchScore": score,
            "reasoning": format!("{name} suits an analytical coder."),
            "strengths": ["coding", "problem solving"],
            "gaps": ["communication"],
            "resources": [
                {"title": format!("{name} basics"), "type": kind, "url": "https://example.com/learn"}
            ]
        })
    };
    json!({
        "careers": [
            career("Software Engineer", 94, "Course"),
            career("Data Scientist", 89, "Tutorial"),
            career("Security Analyst", 77, "Video")
        ]
    })
}
