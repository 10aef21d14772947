// HTTP request handlers
use crate::domain::chart::ChartSeries;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{extract::State, response::Html, Json};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Dashboard page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Per-location chart series built from the grouping query
pub async fn chart_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChartSeries>>, ApiError> {
    let series = state.chart_service.get_series().await?;
    Ok(Json(series))
}
