use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::{Backend, DatabaseError};
use crate::types::{MenuItem, MenuItemPatch, MenuKind, NewMenuItem, NewOrder, NewUser, Order, Role, User};

/// Data access for orders, menu items and users
///
/// Both backends implement the same SQL surface; handlers only ever see
/// `Arc<dyn OrderStore>`.
#[async_trait]
pub trait OrderStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// Create tables and indexes if they do not exist yet
    async fn migrate(&self) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Newest first, optionally restricted to one status
    async fn list_orders(&self, status: Option<&str>) -> Result<Vec<Order>, DatabaseError>;
    /// Newest first, created at or after `since`
    async fn list_orders_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>, DatabaseError>;
    async fn get_order(&self, id: i64) -> Result<Order, DatabaseError>;
    async fn create_order(&self, order: &NewOrder) -> Result<Order, DatabaseError>;
    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order, DatabaseError>;
    async fn delete_order(&self, id: i64) -> Result<(), DatabaseError>;

    async fn list_menu(&self, kind: Option<MenuKind>) -> Result<Vec<MenuItem>, DatabaseError>;
    async fn find_menu_item(&self, kind: MenuKind, name: &str) -> Result<Option<MenuItem>, DatabaseError>;
    async fn create_menu_item(&self, item: &NewMenuItem) -> Result<MenuItem, DatabaseError>;
    async fn update_menu_item(&self, id: i64, patch: &MenuItemPatch) -> Result<MenuItem, DatabaseError>;
    async fn delete_menu_item(&self, id: i64) -> Result<(), DatabaseError>;

    async fn count_users(&self) -> Result<i64, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn get_user(&self, id: i64) -> Result<User, DatabaseError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError>;
    async fn update_user(
        &self,
        id: i64,
        role: Option<Role>,
        password_hash: Option<&str>,
    ) -> Result<User, DatabaseError>;
    async fn delete_user(&self, id: i64) -> Result<(), DatabaseError>;
}

/// Expands the shared SQL implementation of [`OrderStore`] for a store type
/// holding `pool: sqlx::Pool<$db>` and a `SCHEMA: &[&str]` constant.
macro_rules! impl_order_store {
    ($store:ty, $backend:expr) => {
        #[async_trait::async_trait]
        impl $crate::database::store::OrderStore for $store {
            fn backend(&self) -> $crate::database::manager::Backend {
                $backend
            }

            async fn migrate(&self) -> Result<(), $crate::database::manager::DatabaseError> {
                for statement in Self::SCHEMA {
                    sqlx::query(statement).execute(&self.pool).await?;
                }
                tracing::info!("Schema ready ({:?})", $backend);
                Ok(())
            }

            async fn health_check(&self) -> Result<(), $crate::database::manager::DatabaseError> {
                sqlx::query("SELECT 1").execute(&self.pool).await?;
                Ok(())
            }

            async fn list_orders(
                &self,
                status: Option<&str>,
            ) -> Result<Vec<$crate::types::Order>, $crate::database::manager::DatabaseError> {
                let orders = sqlx::query_as::<_, $crate::types::Order>(
                    "SELECT id, customer_name, item_type, feteer_type, sweet_type, sweet_selections, \
                     meat_selection, status, price, created_at, notes \
                     FROM orders WHERE ($1 IS NULL OR status = $1) \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?;
                Ok(orders)
            }

            async fn list_orders_since(
                &self,
                since: chrono::DateTime<chrono::Utc>,
            ) -> Result<Vec<$crate::types::Order>, $crate::database::manager::DatabaseError> {
                let orders = sqlx::query_as::<_, $crate::types::Order>(
                    "SELECT id, customer_name, item_type, feteer_type, sweet_type, sweet_selections, \
                     meat_selection, status, price, created_at, notes \
                     FROM orders WHERE created_at >= $1 \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(since)
                .fetch_all(&self.pool)
                .await?;
                Ok(orders)
            }

            async fn get_order(
                &self,
                id: i64,
            ) -> Result<$crate::types::Order, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::Order>(
                    "SELECT id, customer_name, item_type, feteer_type, sweet_type, sweet_selections, \
                     meat_selection, status, price, created_at, notes \
                     FROM orders WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| $crate::database::manager::DatabaseError::NotFound(format!("Order {} not found", id)))
            }

            async fn create_order(
                &self,
                order: &$crate::types::NewOrder,
            ) -> Result<$crate::types::Order, $crate::database::manager::DatabaseError> {
                let created = sqlx::query_as::<_, $crate::types::Order>(
                    "INSERT INTO orders (customer_name, item_type, feteer_type, sweet_type, \
                     sweet_selections, meat_selection, status, price, created_at, notes) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                     RETURNING id, customer_name, item_type, feteer_type, sweet_type, sweet_selections, \
                     meat_selection, status, price, created_at, notes",
                )
                .bind(&order.customer_name)
                .bind(order.item_type.as_str())
                .bind(&order.feteer_type)
                .bind(&order.sweet_type)
                .bind(&order.sweet_selections)
                .bind(&order.meat_selection)
                .bind(&order.status)
                .bind(order.price)
                .bind(order.created_at)
                .bind(&order.notes)
                .fetch_one(&self.pool)
                .await?;
                Ok(created)
            }

            async fn update_order_status(
                &self,
                id: i64,
                status: &str,
            ) -> Result<$crate::types::Order, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::Order>(
                    "UPDATE orders SET status = $1 WHERE id = $2 \
                     RETURNING id, customer_name, item_type, feteer_type, sweet_type, sweet_selections, \
                     meat_selection, status, price, created_at, notes",
                )
                .bind(status)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| $crate::database::manager::DatabaseError::NotFound(format!("Order {} not found", id)))
            }

            async fn delete_order(&self, id: i64) -> Result<(), $crate::database::manager::DatabaseError> {
                let result = sqlx::query("DELETE FROM orders WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err($crate::database::manager::DatabaseError::NotFound(format!("Order {} not found", id)));
                }
                Ok(())
            }

            async fn list_menu(
                &self,
                kind: Option<$crate::types::MenuKind>,
            ) -> Result<Vec<$crate::types::MenuItem>, $crate::database::manager::DatabaseError> {
                let items = sqlx::query_as::<_, $crate::types::MenuItem>(
                    "SELECT id, kind, name, price, available FROM menu_items \
                     WHERE ($1 IS NULL OR kind = $1) ORDER BY kind, name",
                )
                .bind(kind.map(|k| k.as_str()))
                .fetch_all(&self.pool)
                .await?;
                Ok(items)
            }

            async fn find_menu_item(
                &self,
                kind: $crate::types::MenuKind,
                name: &str,
            ) -> Result<Option<$crate::types::MenuItem>, $crate::database::manager::DatabaseError> {
                let item = sqlx::query_as::<_, $crate::types::MenuItem>(
                    "SELECT id, kind, name, price, available FROM menu_items WHERE kind = $1 AND name = $2",
                )
                .bind(kind.as_str())
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
                Ok(item)
            }

            async fn create_menu_item(
                &self,
                item: &$crate::types::NewMenuItem,
            ) -> Result<$crate::types::MenuItem, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::MenuItem>(
                    "INSERT INTO menu_items (kind, name, price, available) VALUES ($1, $2, $3, $4) \
                     RETURNING id, kind, name, price, available",
                )
                .bind(item.kind.as_str())
                .bind(&item.name)
                .bind(item.price)
                .bind(item.available)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| $crate::database::manager::DatabaseError::from_write(
                    e,
                    format!("Menu item '{}' already exists", item.name),
                ))
            }

            async fn update_menu_item(
                &self,
                id: i64,
                patch: &$crate::types::MenuItemPatch,
            ) -> Result<$crate::types::MenuItem, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::MenuItem>(
                    "UPDATE menu_items SET name = COALESCE($1, name), price = COALESCE($2, price), \
                     available = COALESCE($3, available) WHERE id = $4 \
                     RETURNING id, kind, name, price, available",
                )
                .bind(&patch.name)
                .bind(patch.price)
                .bind(patch.available)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| $crate::database::manager::DatabaseError::from_write(
                    e,
                    "A menu item with that name already exists".to_string(),
                ))?
                .ok_or_else(|| $crate::database::manager::DatabaseError::NotFound(format!("Menu item {} not found", id)))
            }

            async fn delete_menu_item(&self, id: i64) -> Result<(), $crate::database::manager::DatabaseError> {
                let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err($crate::database::manager::DatabaseError::NotFound(format!("Menu item {} not found", id)));
                }
                Ok(())
            }

            async fn count_users(&self) -> Result<i64, $crate::database::manager::DatabaseError> {
                let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await?;
                Ok(count)
            }

            async fn list_users(&self) -> Result<Vec<$crate::types::User>, $crate::database::manager::DatabaseError> {
                let users = sqlx::query_as::<_, $crate::types::User>(
                    "SELECT id, username, password_hash, role, created_at FROM users ORDER BY username",
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(users)
            }

            async fn get_user(&self, id: i64) -> Result<$crate::types::User, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::User>(
                    "SELECT id, username, password_hash, role, created_at FROM users WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| $crate::database::manager::DatabaseError::NotFound(format!("User {} not found", id)))
            }

            async fn find_user_by_username(
                &self,
                username: &str,
            ) -> Result<Option<$crate::types::User>, $crate::database::manager::DatabaseError> {
                let user = sqlx::query_as::<_, $crate::types::User>(
                    "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
                Ok(user)
            }

            async fn create_user(
                &self,
                user: &$crate::types::NewUser,
            ) -> Result<$crate::types::User, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::User>(
                    "INSERT INTO users (username, password_hash, role, created_at) VALUES ($1, $2, $3, $4) \
                     RETURNING id, username, password_hash, role, created_at",
                )
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .bind(chrono::Utc::now())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| $crate::database::manager::DatabaseError::from_write(
                    e,
                    format!("User '{}' already exists", user.username),
                ))
            }

            async fn update_user(
                &self,
                id: i64,
                role: Option<$crate::types::Role>,
                password_hash: Option<&str>,
            ) -> Result<$crate::types::User, $crate::database::manager::DatabaseError> {
                sqlx::query_as::<_, $crate::types::User>(
                    "UPDATE users SET role = COALESCE($1, role), password_hash = COALESCE($2, password_hash) \
                     WHERE id = $3 RETURNING id, username, password_hash, role, created_at",
                )
                .bind(role.map(|r| r.as_str()))
                .bind(password_hash)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| $crate::database::manager::DatabaseError::NotFound(format!("User {} not found", id)))
            }

            async fn delete_user(&self, id: i64) -> Result<(), $crate::database::manager::DatabaseError> {
                let result = sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err($crate::database::manager::DatabaseError::NotFound(format!("User {} not found", id)));
                }
                Ok(())
            }
        }
    };
}

pub(crate) use impl_order_store;
