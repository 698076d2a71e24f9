pub mod analytics;
pub mod order_intake;
pub mod users;

pub use analytics::{summarize, AnalyticsSummary};
pub use order_intake::prepare_order;
pub use users::{check_credentials, register_user, seed_admin};
