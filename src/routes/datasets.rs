use axum::{
    extract::State,
    http::Method,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    services::{
        analytics::{self, Dataset, DatasetAnalysis, FilterState, Row, Trend},
        insight_agent::Insight,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets/analyze", post(analyze_dataset))
        .route("/datasets/filter", post(filter_dataset))
        .route("/datasets/signals", post(dataset_signals))
        .route("/datasets/insights", post(dataset_insights))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    rows: Vec<Row>,
    filters: FilterState,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub struct SignalsRequest {
    values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct SignalsResponse {
    trend: Trend,
    anomaly_indices: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    insights: Vec<Insight>,
}

fn check_row_cap(state: &AppState, dataset: &Dataset) -> Result<(), AppError> {
    if dataset.rows.len() > state.config.max_rows {
        return Err(AppError::InvalidInput(format!(
            "Dataset has {} rows, limit is {}",
            dataset.rows.len(),
            state.config.max_rows
        )));
    }
    Ok(())
}

#[axum::debug_handler]
async fn analyze_dataset(
    State(state): State<Arc<AppState>>,
    Json(dataset): Json<Dataset>,
) -> Result<Json<DatasetAnalysis>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!(
        "Starting analysis for dataset: {} ({} rows, {} columns)",
        dataset.name,
        dataset.rows.len(),
        dataset.headers.len()
    );

    check_row_cap(&state, &dataset)?;
    let analysis = analytics::analyze_dataset(&dataset);

    tracing::info!(
        "Analysis completed in {:?}: {} numeric, {} text, {} date columns",
        start.elapsed(),
        analysis.summary.numeric_columns.len(),
        analysis.summary.text_columns.len(),
        analysis.summary.date_columns.len()
    );

    Ok(Json(analysis))
}

async fn filter_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<FilterResponse>, AppError> {
    if request.rows.len() > state.config.max_rows {
        return Err(AppError::InvalidInput(format!(
            "Request has {} rows, limit is {}",
            request.rows.len(),
            state.config.max_rows
        )));
    }

    let rows = analytics::filter_rows(&request.rows, &request.filters);
    tracing::info!("Filter kept {}/{} rows", rows.len(), request.rows.len());

    Ok(Json(FilterResponse { rows }))
}

async fn dataset_signals(
    Json(request): Json<SignalsRequest>,
) -> Result<Json<SignalsResponse>, AppError> {
    let trend = analytics::estimate_trend(&request.values);
    let anomaly_indices = analytics::detect_anomalies(&request.values);

    Ok(Json(SignalsResponse {
        trend,
        anomaly_indices,
    }))
}

async fn dataset_insights(
    State(state): State<Arc<AppState>>,
    Json(dataset): Json<Dataset>,
) -> Result<Json<InsightsResponse>, AppError> {
    let start = std::time::Instant::now();
    check_row_cap(&state, &dataset)?;

    let analysis = analytics::analyze_dataset(&dataset);
    let digest = analytics::build_digest(&dataset, &analysis);

    let insights = state.insight_agent.generate_insights(&digest).await?;
    tracing::info!(
        "Generated {} insights for {} in {:?}",
        insights.len(),
        dataset.name,
        start.elapsed()
    );

    Ok(Json(InsightsResponse { insights }))
}
