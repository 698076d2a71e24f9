// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and release. The route guard lets these through for
// anonymous callers; `/login` itself bounces signed-in users to `/`.

pub mod auth; // POST /api/auth/login, POST /api/auth/logout, GET /login

pub use auth::{login_page, login_post, logout_post};
