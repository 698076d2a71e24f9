pub mod manager;
pub mod postgres;
pub mod sqlite;
pub mod store;

pub use manager::{Backend, DatabaseError, DatabaseManager};
pub use postgres::PgOrderStore;
pub use sqlite::SqliteOrderStore;
pub use store::OrderStore;
