use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::{authenticate, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

const PUBLIC_PATHS: &[&str] = &["/health", "/login", "/api/auth/login", "/api/auth/logout", "/favicon.ico"];
const PUBLIC_PREFIXES: &[&str] = &["/static"];
const ADMIN_PREFIXES: &[&str] = &["/admin", "/api/admin"];

/// Access class of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    AdminOnly,
}

/// What the guard does with a request
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Allow,
    Unauthorized,
    Forbidden,
    Redirect(String),
}

pub fn classify(path: &str) -> Access {
    if PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| under(path, p)) {
        Access::Public
    } else if ADMIN_PREFIXES.iter().any(|p| under(path, p)) {
        Access::AdminOnly
    } else {
        Access::Authenticated
    }
}

/// `path` equals `prefix` or sits below it on a segment boundary
fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn is_api(path: &str) -> bool {
    under(path, "/api")
}

/// Pure routing decision; `target` is the path plus query used for the login redirect
pub fn decide(path: &str, target: &str, user: Option<&AuthUser>) -> GuardDecision {
    match (classify(path), user) {
        (Access::Public, Some(_)) if path == "/login" => GuardDecision::Redirect("/".to_string()),
        (Access::Public, _) => GuardDecision::Allow,
        (_, None) if is_api(path) => GuardDecision::Unauthorized,
        (_, None) => GuardDecision::Redirect(login_redirect(target)),
        (Access::AdminOnly, Some(user)) if !user.is_admin() => {
            if is_api(path) {
                GuardDecision::Forbidden
            } else {
                GuardDecision::Redirect("/".to_string())
            }
        }
        (_, Some(_)) => GuardDecision::Allow,
    }
}

fn login_redirect(target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("/login?from={}", encoded)
}

/// Applied to every route: authenticates, then allows, rejects or redirects
pub async fn route_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = authenticate(request.headers(), &state.tokens, state.cookie_name());
    let path = request.uri().path().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let decision = decide(&path, &target, user.as_ref());
    tracing::debug!(
        path = %path,
        user = user.as_ref().map(|u| u.username.as_str()).unwrap_or("-"),
        "route guard: {:?}",
        decision
    );

    match decision {
        GuardDecision::Allow => {
            if let Some(user) = user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        GuardDecision::Unauthorized => ApiError::unauthorized("Authentication required").into_response(),
        GuardDecision::Forbidden => ApiError::forbidden("Admin access required").into_response(),
        GuardDecision::Redirect(to) => Redirect::temporary(&to).into_response(),
    }
}
