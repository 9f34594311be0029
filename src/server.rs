//! Bedrock-runtime-compatible HTTP server returning synthetic completions.
//!
//! No inference happens here: every invocation gets a canned completion
//! shaped like the real model family's response, after an artificial delay.
//!
//! ## Endpoints
//!
//! - `GET /health`: liveness probe
//! - `POST /model/{modelId}/invoke`: synchronous invocation
//! - `POST /model/{modelId}/invoke-with-response-stream`: same payload,
//!   written as a single chunk with the event-stream content type
//! - `OPTIONS *`: CORS preflight
//!
//! Anything else answers 404.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::catalog::ModelCatalog;
use crate::config::ServerConfig;
use crate::error::MockError;
use crate::request::{InvocationRequest, LOG_PREVIEW_CHARS};
use crate::response::{self, InvocationResponse};

/// Content type of `invoke-with-response-stream` responses.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";

const CORS_ALLOW_ORIGIN: &str = "*";
const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Amz-Date, X-Amz-Security-Token";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: String,
    /// Current time, ISO-8601 UTC with milliseconds.
    pub timestamp: String,
}

/// Response for unmatched routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundResponse {
    /// Always `"Not found"`.
    pub error: String,
    /// Request path, without the query string.
    pub path: String,
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    /// Read-only model table.
    catalog: Arc<ModelCatalog>,
    /// Artificial delay window in milliseconds, `[min, max)`.
    latency_ms: (u64, u64),
}

/// Build the mock's router.
///
/// Exposed separately from [`MockServer`] so it can be driven in-process.
/// Request bodies are not size-limited. axum answers `HEAD /health` through
/// the GET handler (200, empty body) rather than 404.
pub fn router(catalog: Arc<ModelCatalog>, config: &ServerConfig) -> Router {
    let state = AppState {
        catalog,
        latency_ms: config.latency_ms,
    };

    Router::new()
        .route("/health", get(handle_health))
        .route("/model/{model_id}/invoke", post(handle_invoke))
        .route(
            "/model/{model_id}/invoke-with-response-stream",
            post(handle_invoke_stream),
        )
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// MockServer
// ---------------------------------------------------------------------------

/// A running mock server on a background tokio task.
pub struct MockServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start the mock server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the listener cannot bind.
    pub async fn start(catalog: Arc<ModelCatalog>, config: &ServerConfig) -> crate::Result<Self> {
        config.validate()?;
        let app = router(catalog, config);

        let listener = TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;

        info!("mock bedrock listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("mock bedrock server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:8080`.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port())
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current time as ISO-8601 UTC with millisecond precision.
fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Draw a delay uniformly from `[min, max)` milliseconds.
fn sample_latency((min_ms, max_ms): (u64, u64)) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..max_ms))
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
}

/// Parse, delay and synthesize one invocation.
async fn invoke(
    state: &AppState,
    model_id: &str,
    raw_body: &[u8],
    stream: bool,
) -> Result<InvocationResponse, MockError> {
    let request = InvocationRequest::parse(raw_body).inspect_err(|e| {
        warn!(model_id, stream, error = %e, "rejected invocation");
    })?;

    info!(model_id, stream, "invoke");
    info!(request = %request.log_preview(LOG_PREVIEW_CHARS), "request body");

    tokio::time::sleep(sample_latency(state.latency_ms)).await;

    let response = response::synthesize(&state.catalog, model_id, &request);
    let (input_tokens, output_tokens) = response.token_counts();
    info!(model_id, input_tokens, output_tokens, "response");
    Ok(response)
}

// ---------------------------------------------------------------------------
// Middleware and route handlers
// ---------------------------------------------------------------------------

/// Answer preflight requests and stamp CORS headers on everything else.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };
    apply_cors_headers(response.headers_mut());
    response
}

/// `GET /health`
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_owned(),
        timestamp: iso_timestamp(),
    })
}

/// `POST /model/{model_id}/invoke`
async fn handle_invoke(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
    body: Bytes,
) -> Result<Json<InvocationResponse>, MockError> {
    let response = invoke(&state, &model_id, &body, false).await?;
    Ok(Json(response))
}

/// `POST /model/{model_id}/invoke-with-response-stream`
///
/// The payload goes out as one unframed chunk; the body has no known length,
/// so HTTP/1.1 clients see `Transfer-Encoding: chunked`.
async fn handle_invoke_stream(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
    body: Bytes,
) -> Result<Response, MockError> {
    let response = invoke(&state, &model_id, &body, true).await?;
    let payload = Bytes::from(serde_json::to_vec(&response)?);
    let chunk = futures_util::stream::once(async move { Ok::<_, Infallible>(payload) });
    Ok((
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
        )],
        Body::from_stream(chunk),
    )
        .into_response())
}

/// Fallback for unmatched paths and methods.
async fn handle_not_found(uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Not found".to_owned(),
            path: uri.path().to_owned(),
        }),
    )
}
