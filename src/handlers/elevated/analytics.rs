use axum::extract::{Query, State};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::analytics::{summarize, window_days, window_start, AnalyticsSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
}

/// GET /api/admin/analytics[?days=N] - sales summary, default 30 days
pub async fn analytics_get(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<AnalyticsSummary> {
    let days = window_days(query.days);
    let now = chrono::Utc::now();
    let orders = state.store.list_orders_since(window_start(days, now)).await?;
    Ok(ApiResponse::success(summarize(&orders, days, now)))
}
