use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use market_study_core::domain::request::AnalyzeRequest;
use market_study_core::domain::response::AnalyzeResponse;
use market_study_core::error::{DownloadError, ServiceError};
use market_study_core::service::AnalysisService;
use market_study_core::storage::reports::{self, ReportInfo};

const BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/download/:filename", get(download))
        .route("/api/reports", get(list_reports))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    details: String,
    status_code: u16,
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Forbidden,
    NotFound(&'static str),
    Internal {
        details: &'static str,
        source: anyhow::Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(details) => (StatusCode::BAD_REQUEST, "Invalid request", details),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Access denied",
                "The requested file name is not allowed".to_string(),
            ),
            ApiError::NotFound(details) => (StatusCode::NOT_FOUND, "Not found", details.to_string()),
            ApiError::Internal { details, source } => {
                sentry_anyhow::capture_anyhow(&source);
                tracing::error!(error = %format!("{source:#}"), "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", details.to_string())
            }
        };
        let body = ErrorResponse {
            error: error.to_string(),
            details,
            status_code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(e) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal {
                details: "The report could not be generated",
                source: anyhow::Error::new(other),
            },
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(concat!(
        "<!doctype html><html><head><title>Market study API</title></head><body>",
        "<h1>Market study API</h1><ul>",
        "<li><code>POST /api/analyze</code> {\"products\": [...], \"sector\": \"...\"}</li>",
        "<li><code>GET /api/download/&lt;filename&gt;</code></li>",
        "<li><code>GET /api/reports</code></li>",
        "<li><code>GET /health</code></li>",
        "</ul></body></html>"
    ))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "market-study",
    }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected analyze body");
        ApiError::BadRequest("Body must be a JSON object with 'products' and 'sector'".to_string())
    })?;
    tracing::info!(sector = %request.sector, products = request.products.len(), "analyze requested");

    Ok(Json(state.service.analyze(request).await?))
}

async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response, ApiError> {
    let path = reports::resolve_download(state.service.reports_dir(), &filename).map_err(|e| match e {
        DownloadError::Forbidden => {
            tracing::warn!(%filename, "refused download name");
            ApiError::Forbidden
        }
        DownloadError::NotFound => ApiError::NotFound("Report not found"),
    })?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| ApiError::Internal {
        details: "The report could not be read",
        source: anyhow::Error::new(e).context(format!("failed to read report {filename}")),
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
struct ReportList {
    total: usize,
    reports: Vec<ReportInfo>,
}

async fn list_reports(State(state): State<AppState>) -> Result<Json<ReportList>, ApiError> {
    let reports = reports::list_reports(state.service.reports_dir()).map_err(|source| ApiError::Internal {
        details: "Reports could not be listed",
        source,
    })?;
    Ok(Json(ReportList {
        total: reports.len(),
        reports,
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("The requested resource does not exist")
}
