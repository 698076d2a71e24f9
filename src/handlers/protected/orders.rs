// handlers/protected/orders.rs - order intake and kitchen queue

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::prepare_order;
use crate::state::AppState;
use crate::types::{Order, OrderDraft};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// GET /api/orders[?status=...] - newest first
pub async fn orders_list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Order>> {
    let status = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let orders = state.store.list_orders(status).await?;
    Ok(ApiResponse::success(orders))
}

/// POST /api/orders - validate, price from the menu when needed, enqueue
pub async fn orders_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<OrderDraft>,
) -> ApiResult<Order> {
    let new_order = prepare_order(state.store.as_ref(), &state.config.orders, &draft).await?;
    let order = state.store.create_order(&new_order).await?;

    tracing::info!(
        order_id = order.id,
        taken_by = %user.username,
        "Order for {}: {} ({:.2})",
        order.customer_name,
        order.summary(),
        order.price
    );
    Ok(ApiResponse::created(order))
}

/// GET /api/orders/:id
pub async fn order_get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Order> {
    let order = state.store.get_order(id).await?;
    Ok(ApiResponse::success(order))
}

/// PATCH /api/orders/:id - move an order through the configured statuses
pub async fn order_patch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Order> {
    let status = update.status.trim();
    if !state.config.orders.is_known_status(status) {
        return Err(ApiError::invalid_field(
            "status",
            format!(
                "Unknown status '{}'; expected one of: {}",
                status,
                state.config.orders.statuses.join(", ")
            ),
        ));
    }

    let order = state.store.update_order_status(id, status).await?;
    tracing::info!(order_id = id, "Order moved to '{}'", order.status);
    Ok(ApiResponse::success(order))
}

/// DELETE /api/orders/:id
pub async fn order_delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_order(id).await?;
    tracing::info!(order_id = id, "Order deleted");
    Ok(ApiResponse::no_content())
}
