// Farm Dashboard - Web Server
// JSON REST API with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use farm_dashboard::{
    filter_crops, filter_tasks, logging, search_farms, AggregationEngine, AlertProfile, Crop, CropFilter,
    DashboardConfig, DashboardView, Farm, FarmSort, FinanceView, InMemoryStore, RecordId, RecordStore, StoreError,
    Task, TaskFilter, TransactionFilter, WeatherAlert, WeatherView,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<InMemoryStore>,
    engine: Arc<AggregationEngine>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
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
}

/// Error half of the envelope
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StoreError::Duplicate(_) => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct FarmListQuery {
    search: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ViewQuery {
    date: Option<String>,
    filter: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AlertQuery {
    profile: Option<String>,
}

/// Missing or empty parameter parses as the type's default.
fn parse_param<T>(raw: Option<&str>) -> Result<T, ApiError>
where
    T: FromStr<Err = StoreError> + Default,
{
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse().map_err(ApiError::from),
        None => Ok(T::default()),
    }
}

fn reference_date(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| ApiError::bad_request(format!("invalid date: {} (expected YYYY-MM-DD)", value))),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/farms?search=&sort= - Search and sort farms
async fn list_farms(State(state): State<AppState>, Query(query): Query<FarmListQuery>) -> ApiResult<Vec<Farm>> {
    let sort: FarmSort = parse_param(query.sort.as_deref())?;
    let farms = state.store.list_farms();
    let found = search_farms(&farms, query.search.as_deref().unwrap_or(""), sort)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ApiResponse::ok(found)))
}

/// GET /api/farms/:id/dashboard?date= - Dashboard view of one farm
async fn farm_dashboard(
    State(state): State<AppState>,
    Path(farm_id): Path<RecordId>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<DashboardView> {
    let reference = reference_date(query.date.as_deref())?;
    let store = &state.store;

    let view = state.engine.dashboard_view(
        &store.list_crops_for_farm(farm_id)?,
        &store.list_tasks_for_farm(farm_id)?,
        &store.list_transactions_for_farm(farm_id)?,
        &store.list_weather_forecast(),
        reference,
    );

    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/farms/:id/finance?filter=&date= - Totals, trend and transactions
async fn farm_finance(
    State(state): State<AppState>,
    Path(farm_id): Path<RecordId>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<FinanceView> {
    let reference = reference_date(query.date.as_deref())?;
    let filter: TransactionFilter = parse_param(query.filter.as_deref())?;
    let transactions = state.store.list_transactions_for_farm(farm_id)?;

    Ok(Json(ApiResponse::ok(state.engine.finance_view(&transactions, filter, reference))))
}

/// GET /api/farms/:id/tasks?filter=&date= - Filtered task list
async fn farm_tasks(
    State(state): State<AppState>,
    Path(farm_id): Path<RecordId>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Vec<Task>> {
    let reference = reference_date(query.date.as_deref())?;
    let filter: TaskFilter = parse_param(query.filter.as_deref())?;
    let tasks = state.store.list_tasks_for_farm(farm_id)?;

    let selected = filter_tasks(&tasks, filter, reference).into_iter().cloned().collect();
    Ok(Json(ApiResponse::ok(selected)))
}

/// Crop plus its countdown to harvest
#[derive(Serialize)]
struct CropResponse {
    #[serde(flatten)]
    crop: Crop,
    display_name: String,
    days_to_harvest: Option<i64>,
}

/// GET /api/farms/:id/crops?status=&date= - Crops filtered by status
async fn farm_crops(
    State(state): State<AppState>,
    Path(farm_id): Path<RecordId>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Vec<CropResponse>> {
    let reference = reference_date(query.date.as_deref())?;
    let filter: CropFilter = parse_param(query.status.as_deref())?;
    let crops = state.store.list_crops_for_farm(farm_id)?;

    let response = filter_crops(&crops, filter)
        .into_iter()
        .map(|crop| CropResponse {
            crop: crop.clone(),
            display_name: crop.display_name(),
            days_to_harvest: crop.days_to_harvest(reference),
        })
        .collect();

    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/weather - Forecast, extended alerts, averages and advisories
async fn weather(State(state): State<AppState>) -> ApiResult<WeatherView> {
    let forecast = state.store.list_weather_forecast();
    Ok(Json(ApiResponse::ok(state.engine.weather_view(&forecast))))
}

/// GET /api/weather/alerts?profile= - Alerts for today under one rule selection
async fn weather_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> ApiResult<Vec<WeatherAlert>> {
    let profile: AlertProfile = parse_param(query.profile.as_deref())?;
    let forecast = state.store.list_weather_forecast();

    Ok(Json(ApiResponse::ok(state.engine.alerts_for(&forecast, profile))))
}

// ============================================================================
// Main Server
// ============================================================================

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/farms", get(list_farms))
        .route("/farms/:id/dashboard", get(farm_dashboard))
        .route("/farms/:id/finance", get(farm_finance))
        .route("/farms/:id/tasks", get(farm_tasks))
        .route("/farms/:id/crops", get(farm_crops))
        .route("/weather", get(weather))
        .route("/weather/alerts", get(weather_alerts))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// Farm dashboard JSON API server.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot data file, overrides the configured one
    #[arg(long)]
    data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    if let Some(data) = args.data {
        config.data_path = data;
    }
    logging::init(config.json_logs);

    let store = InMemoryStore::load_snapshot(&config.data_path).map_err(|e| {
        error!("Data file not loaded: {:#}", e);
        e
    })?;
    let engine = AggregationEngine::from_config(&config)?;

    let state = AppState {
        store: Arc::new(store),
        engine: Arc::new(engine),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("🚀 Server running on http://{}", config.bind_addr);
    info!("   API: http://{}/api/farms", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
