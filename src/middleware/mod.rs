pub mod auth;
pub mod guard;
pub mod response;

pub use auth::{authenticate, extract_token, AuthUser};
pub use guard::{classify, route_guard, Access, GuardDecision};
pub use response::{ApiResponse, ApiResult};
