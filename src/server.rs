//! HTTP service: `POST /api/convertDocx` and `GET /health`.
//!
//! The handler never lets a failure escape as a bare status or empty body:
//! every outcome is a JSON object with a `success` flag. Errors are logged
//! at the boundary and rendered through `IntoResponse for Docx2MdError`.
//!
//! CORS is fully permissive (`Access-Control-Allow-Origin: *`) because the
//! endpoint is called directly from browser-based editors.

use crate::config::{ConversionConfig, ServiceConfig};
use crate::convert::convert_base64;
use crate::error::Docx2MdError;
use crate::output::ConversionOutput;
use crate::pipeline::docx::DocumentConverter;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Route of the conversion endpoint.
pub const CONVERT_ROUTE: &str = "/api/convertDocx";

/// Route of the health endpoint.
pub const HEALTH_ROUTE: &str = "/health";

/// State shared by all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    converter: Arc<dyn DocumentConverter>,
    conversion: Arc<ConversionConfig>,
    /// Outcome of the one-time [`ServiceConfig::validate`] call.
    readiness: Result<(), Docx2MdError>,
    max_body_bytes: usize,
}

impl AppState {
    /// Validate `config` once and capture everything handlers need.
    ///
    /// An invalid configuration does not prevent construction; conversion
    /// requests are answered with the configuration error instead.
    pub fn new(config: &ServiceConfig, converter: Arc<dyn DocumentConverter>) -> Self {
        let readiness = config.validate();
        match &readiness {
            Ok(()) => info!("Service configuration valid: {:?}", config),
            Err(e) => error!("Service configuration invalid, conversions will fail: {}", e),
        }
        Self {
            converter,
            conversion: Arc::new(config.conversion.clone()),
            readiness,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// `true` when the configuration passed validation.
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ok()
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

/// Request body of `POST /api/convertDocx`.
#[derive(Debug, Deserialize)]
struct ConvertRequest {
    docx: Option<String>,
}

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub markdown: String,
    pub title: String,
    pub image_count: usize,
}

impl From<ConversionOutput> for ConvertResponse {
    fn from(out: ConversionOutput) -> Self {
        Self {
            success: true,
            markdown: out.markdown,
            title: out.title,
            image_count: out.image_count,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for Docx2MdError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// ── Router ───────────────────────────────────────────────────────────────

/// Build the service router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route(CONVERT_ROUTE, post(convert_docx))
        .route(HEALTH_ROUTE, get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already-bound listener until the process is interrupted.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("docx2md listening on http://{}{}", addr, CONVERT_ROUTE);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Bind `config.bind_addr` and serve.
pub async fn start_server(
    config: ServiceConfig,
    converter: Arc<dyn DocumentConverter>,
) -> std::io::Result<()> {
    let state = AppState::new(&config, converter);
    let listener = TcpListener::bind(config.bind_addr).await?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ── Handlers ─────────────────────────────────────────────────────────────

/// Handler for `POST /api/convertDocx`.
pub async fn convert_docx(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match handle_convert(&state, body).await {
        Ok(output) => (StatusCode::OK, Json(ConvertResponse::from(output))).into_response(),
        Err(e) => {
            if e.status_code().is_client_error() {
                warn!(kind = e.kind(), "Rejected conversion request: {}", e);
            } else {
                error!(kind = e.kind(), detail = ?e, "Conversion error: {}", e);
            }
            e.into_response()
        }
    }
}

async fn handle_convert(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<ConversionOutput, Docx2MdError> {
    state.readiness.clone()?;

    let body = body.map_err(|rejection| {
        Docx2MdError::InvalidInput(format!(
            "Could not read request body: {}",
            rejection.body_text()
        ))
    })?;
    let payload = parse_request(&body)?;
    info!("DOCX conversion request received: {} base64 chars", payload.len());

    convert_base64(&payload, Arc::clone(&state.converter), &state.conversion).await
}

/// Pull the `docx` field out of the JSON body.
fn parse_request(body: &[u8]) -> Result<String, Docx2MdError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Docx2MdError::missing_document());
    }

    let request: Option<ConvertRequest> = serde_json::from_slice(body)
        .map_err(|e| Docx2MdError::InvalidInput(format!("Invalid JSON body: {e}")))?;

    match request.and_then(|r| r.docx) {
        Some(docx) if !docx.trim().is_empty() => Ok(docx),
        _ => Err(Docx2MdError::missing_document()),
    }
}

/// Handler for `GET /health`.
async fn health(State(state): State<AppState>) -> Response {
    let version = env!("CARGO_PKG_VERSION");
    match &state.readiness {
        Ok(()) => Json(HealthResponse {
            status: "ok",
            version,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "misconfigured",
                version,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}
