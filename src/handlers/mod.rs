// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (any signed-in user) → Elevated (admin role)
//
// Tiers are enforced by the route guard, which runs in front of every route,
// so the handlers themselves only pull `AuthUser` when they need the principal.

pub mod elevated; // Tier 3: admin role required (/api/admin/*)
pub mod protected; // Tier 2: session required (/api/orders, /api/menu, /api/auth/me)
pub mod public; // Tier 1: no authentication (/health, /api/auth/login, /api/auth/logout)

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, Environment};
use crate::middleware::route_guard;
use crate::state::AppState;

/// Build the full application router around shared state
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let request_logging = state.config.server.enable_request_logging;

    let app: Router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/login", get(public::login_page))
        .merge(public_routes())
        .merge(order_routes())
        .merge(menu_routes())
        .merge(admin_routes())
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state);

    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };

    if request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(public::login_post))
        .route("/api/auth/logout", post(public::logout_post))
}

fn order_routes() -> Router<AppState> {
    use protected::orders;

    Router::new()
        .route("/api/auth/me", get(protected::me_get))
        .route("/api/orders", get(orders::orders_list).post(orders::orders_create))
        .route(
            "/api/orders/:id",
            get(orders::order_get)
                .patch(orders::order_patch)
                .delete(orders::order_delete),
        )
}

fn menu_routes() -> Router<AppState> {
    Router::new().route("/api/menu", get(protected::menu_list))
}

fn admin_routes() -> Router<AppState> {
    use elevated::{analytics, menu, users};

    Router::new()
        .route("/api/admin/menu", post(menu::menu_create))
        .route("/api/admin/menu/:id", patch(menu::menu_patch).delete(menu::menu_delete))
        .route("/api/admin/users", get(users::users_list).post(users::users_create))
        .route("/api/admin/users/:id", patch(users::user_patch).delete(users::user_delete))
        .route("/api/admin/analytics", get(analytics::analytics_get))
}

/// Permissive in development; otherwise only the configured origins, with credentials
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.environment == Environment::Development {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::CACHE_CONTROL,
                header::PRAGMA,
                HeaderName::from_static("x-request-timestamp"),
            ])
            .allow_credentials(true),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Feteer Orders API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/login, /api/auth/logout (public), /api/auth/me",
            "orders": "/api/orders[/:id]",
            "menu": "/api/menu",
            "admin": "/api/admin/{menu,users,analytics} (admin only)"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = format!("{:?}", state.store.backend()).to_lowercase();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
                "backend": backend
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                    "backend": backend
                })),
            )
        }
    }
}
