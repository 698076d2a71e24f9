// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Route Prefix: /api/admin/*
// Non-admin sessions are stopped by the route guard with 403 before reaching
// these handlers.

pub mod analytics; // GET /api/admin/analytics
pub mod menu; // /api/admin/menu[/:id]
pub mod users; // /api/admin/users[/:id]
