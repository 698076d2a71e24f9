use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::{MenuItem, MenuItemPatch, NewMenuItem};

fn check_price(price: f64) -> Result<(), ApiError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::invalid_field("price", "Price must be a non-negative number"))
    }
}

fn check_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "Name is required"));
    }
    Ok(name.to_string())
}

/// POST /api/admin/menu
pub async fn menu_create(State(state): State<AppState>, Json(item): Json<NewMenuItem>) -> ApiResult<MenuItem> {
    let item = NewMenuItem {
        name: check_name(&item.name)?,
        ..item
    };
    check_price(item.price)?;

    let created = state.store.create_menu_item(&item).await?;
    tracing::info!("Menu item added: {} '{}' at {:.2}", created.kind.as_str(), created.name, created.price);
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/menu/:id - rename, reprice or toggle availability
pub async fn menu_patch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MenuItemPatch>,
) -> ApiResult<MenuItem> {
    let patch = MenuItemPatch {
        name: patch.name.as_deref().map(check_name).transpose()?,
        ..patch
    };
    if let Some(price) = patch.price {
        check_price(price)?;
    }

    let updated = state.store.update_menu_item(id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/menu/:id
pub async fn menu_delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_menu_item(id).await?;
    tracing::info!(menu_item_id = id, "Menu item removed");
    Ok(ApiResponse::no_content())
}
