use axum::extract::{Query, State};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::{MenuItem, MenuKind};

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub kind: Option<MenuKind>,
}

/// GET /api/menu[?kind=feteer|sweet|meat]
pub async fn menu_list(State(state): State<AppState>, Query(query): Query<MenuQuery>) -> ApiResult<Vec<MenuItem>> {
    let items = state.store.list_menu(query.kind).await?;
    Ok(ApiResponse::success(items))
}
