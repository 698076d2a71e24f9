// handlers/protected/mod.rs - Protected handlers (signed-in user required)
//
// Security Level: any valid session (cookie or Bearer token)
// Route Prefix: /api/* outside /api/admin
// The route guard has already authenticated the caller and stored `AuthUser`
// in the request extensions.

pub mod auth; // GET /api/auth/me
pub mod menu; // GET /api/menu
pub mod orders; // /api/orders[/:id]

pub use auth::me_get;
pub use menu::menu_list;
