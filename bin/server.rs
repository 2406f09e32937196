// Warehouse Stock - Web Dashboard Server
// Upload a ledger CSV, browse per-location cards, download CSV/PDF reports

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warehouse_stock::{
    ingest, location_csv_filename, pdf_filename, render_pdf, report_timestamp, rows_to_csv,
    AggregateRow, ReportError, StockAggregate, StockSummary, AGGREGATE_CSV_FILENAME,
};

/// Shared application state: the current session's aggregate, if any.
/// Each upload replaces it wholesale; nothing persists across restarts.
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Option<StockAggregate>>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One warehouse card: rows sorted by balance descending.
#[derive(Serialize)]
struct LocationCard {
    location: String,
    total: i64,
    rows: Vec<AggregateRow>,
    csv_filename: String,
}

/// Everything the dashboard needs to render one aggregate view.
#[derive(Serialize)]
struct Dashboard {
    summary: StockSummary,
    locations: Vec<LocationCard>,
}

fn dashboard_payload(aggregate: &StockAggregate) -> Dashboard {
    let locations = aggregate
        .location_totals()
        .into_iter()
        .map(|total| LocationCard {
            rows: aggregate.location_rows(&total.location),
            csv_filename: location_csv_filename(&total.location),
            location: total.location,
            total: total.total,
        })
        .collect();

    Dashboard {
        summary: aggregate.summary(),
        locations,
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/upload - Ingest a ledger CSV and replace the session aggregate.
///
/// Status mapping: 200 + success=true is a fresh dashboard; 200 +
/// success=false is the no-sellable-rows notice (a warning, not an error);
/// 4xx carries parse/schema failures.
async fn upload_ledger(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut bytes = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.bytes().await {
                Ok(data) => {
                    bytes = Some(data);
                    break;
                }
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ApiResponse::<Dashboard>::err(format!(
                            "could not read the uploaded file: {e}"
                        ))),
                    )
                        .into_response();
                }
            },
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<Dashboard>::err(format!(
                        "could not read the uploaded file: {e}"
                    ))),
                )
                    .into_response();
            }
        }
    }

    let Some(bytes) = bytes else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Dashboard>::err("no file uploaded")),
        )
            .into_response();
    };

    match ingest(&bytes) {
        Ok(aggregate) => {
            info!(
                rows = aggregate.rows().len(),
                "ledger ingested ({} bytes)",
                bytes.len()
            );
            let payload = dashboard_payload(&aggregate);
            *state.session.lock().unwrap() = Some(aggregate);
            (StatusCode::OK, Json(ApiResponse::ok(payload))).into_response()
        }
        Err(e @ ReportError::NoSellableRows) => {
            warn!("upload produced no sellable rows");
            *state.session.lock().unwrap() = None;
            (StatusCode::OK, Json(ApiResponse::<Dashboard>::err(e.to_string()))).into_response()
        }
        Err(e) => {
            warn!("upload rejected: {e}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<Dashboard>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
struct AggregateQuery {
    filter: Option<String>,
}

/// GET /api/aggregate?filter=<substr> - Dashboard view of the current
/// aggregate, optionally narrowed to MSKUs containing the substring.
async fn get_aggregate(
    State(state): State<AppState>,
    Query(query): Query<AggregateQuery>,
) -> Response {
    let session = state.session.lock().unwrap();

    match session.as_ref() {
        Some(aggregate) => {
            let view = match query.filter.as_deref() {
                Some(needle) if !needle.trim().is_empty() => aggregate.filter_msku(needle),
                _ => aggregate.clone(),
            };
            (StatusCode::OK, Json(ApiResponse::ok(dashboard_payload(&view)))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Dashboard>::err("No ledger uploaded yet")),
        )
            .into_response(),
    }
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn no_session() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("No ledger uploaded yet")),
    )
        .into_response()
}

/// GET /api/export/aggregate.csv - Full aggregate CSV download.
async fn export_aggregate_csv(State(state): State<AppState>) -> Response {
    let session = state.session.lock().unwrap();

    match session.as_ref() {
        Some(aggregate) => match rows_to_csv(aggregate.rows()) {
            Ok(bytes) => attachment(
                bytes,
                "text/csv; charset=utf-8",
                AGGREGATE_CSV_FILENAME.to_string(),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err(e.to_string())),
            )
                .into_response(),
        },
        None => no_session(),
    }
}

/// GET /api/export/location/:location - One location's CSV download.
async fn export_location_csv(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Response {
    // Decode URL-encoded location name
    let location = urlencoding::decode(&location)
        .unwrap_or_else(|_| location.clone().into())
        .into_owned();

    let session = state.session.lock().unwrap();

    match session.as_ref() {
        Some(aggregate) => {
            let rows = aggregate.location_rows(&location);
            if rows.is_empty() {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::<()>::err(format!("unknown location: {location}"))),
                )
                    .into_response();
            }
            match rows_to_csv(&rows) {
                Ok(bytes) => attachment(
                    bytes,
                    "text/csv; charset=utf-8",
                    location_csv_filename(&location),
                ),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::err(e.to_string())),
                )
                    .into_response(),
            }
        }
        None => no_session(),
    }
}

/// GET /api/export/report.pdf - PDF report download.
async fn export_pdf(State(state): State<AppState>) -> Response {
    let session = state.session.lock().unwrap();

    match session.as_ref() {
        Some(aggregate) => {
            let now = Local::now();
            match render_pdf(aggregate, &report_timestamp(now)) {
                Ok(bytes) => attachment(bytes, "application/pdf", pdf_filename(now)),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::err(e.to_string())),
                )
                    .into_response(),
            }
        }
        None => no_session(),
    }
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_server=info,warehouse_stock=info,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();

    let state = AppState {
        session: Arc::new(Mutex::new(None)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload_ledger))
        .route("/aggregate", get(get_aggregate))
        .route("/export/aggregate.csv", get(export_aggregate_csv))
        .route("/export/location/:location", get(export_location_csv))
        .route("/export/report.pdf", get(export_pdf))
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    info!("🚀 dashboard running on http://localhost:3000");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
