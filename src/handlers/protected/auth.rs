use axum::response::Json;

use crate::middleware::AuthUser;

/// GET /api/auth/me - the principal behind the current session
pub async fn me_get(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}
