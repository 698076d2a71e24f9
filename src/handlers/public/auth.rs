// handlers/public/auth.rs - session login/logout

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::check_credentials;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub from: Option<String>,
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", name, token, max_age_secs);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie immediately
pub fn cleared_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

/**
 * POST /api/auth/login - Exchange credentials for a session
 *
 * Input: `{"username": "...", "password": "..."}`
 *
 * Sets the HttpOnly session cookie and also returns the token in the body
 * for clients that authenticate with a Bearer header instead:
 *
 * ```json
 * { "user": {"id": 1, "username": "admin", "role": "admin"}, "token": "eyJ...", "expires_in": 604800 }
 * ```
 */
pub async fn login_post(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = check_credentials(state.store.as_ref(), &request.username, &request.password).await?;
    let token = state.tokens.issue(user.id, &user.username, user.role)?;
    let expires_in = state.tokens.lifetime().num_seconds();

    tracing::info!("User '{}' signed in", user.username);

    let cookie = session_cookie(
        state.cookie_name(),
        &token,
        expires_in,
        state.config.security.secure_cookies,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "user": {
                "id": user.id,
                "username": user.username,
                "role": user.role,
            },
            "token": token,
            "expires_in": expires_in,
        })),
    ))
}

/// POST /api/auth/logout - Clear the session cookie
pub async fn logout_post(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = cleared_cookie(state.cookie_name(), state.config.security.secure_cookies);
    ([(header::SET_COOKIE, cookie)], Json(json!({ "message": "Signed out" })))
}

/// GET /login - Where the guard sends anonymous page requests
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> impl IntoResponse {
    Json(json!({
        "message": "Sign in with POST /api/auth/login",
        "from": query.from.unwrap_or_else(|| "/".to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let cookie = session_cookie("auth_token", "abc", 3600, false);
        assert_eq!(cookie, "auth_token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600");
    }

    #[test]
    fn secure_flag_is_appended_when_configured() {
        assert!(session_cookie("auth_token", "abc", 60, true).ends_with("; Secure"));
        assert!(cleared_cookie("auth_token", true).contains("Max-Age=0"));
    }
}
