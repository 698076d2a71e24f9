//! Account management shared by the auth and admin handlers.

use tracing::{info, warn};

use crate::auth::password::{self, PasswordError};
use crate::config::SecurityConfig;
use crate::database::OrderStore;
use crate::error::ApiError;
use crate::types::{NewUser, Role, User};

/// bcrypt on the blocking pool so slow cost factors do not stall the runtime
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    let hashed = tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("Failed to store password")
        })??;
    Ok(hashed)
}

async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

/// Check a username/password pair; every failure reads the same to the caller
pub async fn check_credentials(store: &dyn OrderStore, username: &str, password: &str) -> Result<User, ApiError> {
    let rejected = || ApiError::unauthorized("Invalid username or password");

    let Some(user) = store.find_user_by_username(username.trim()).await? else {
        warn!("Login rejected for unknown user '{}'", username);
        return Err(rejected());
    };

    if !verify_password(password.to_string(), user.password_hash.clone()).await {
        warn!("Login rejected for '{}': wrong password", user.username);
        return Err(rejected());
    }

    Ok(user)
}

/// Create an account after validating and hashing its password
pub async fn register_user(
    store: &dyn OrderStore,
    security: &SecurityConfig,
    username: &str,
    password: String,
    role: Role,
) -> Result<User, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::invalid_field("username", "Username is required"));
    }

    let password_hash = hash_password(password, security.bcrypt_cost).await?;
    let user = store
        .create_user(&NewUser {
            username: username.to_string(),
            password_hash,
            role,
        })
        .await?;

    info!("Created {} account '{}'", user.role, user.username);
    Ok(user)
}

/// Create the configured admin account when the users table is empty
///
/// Returns the seeded user, or `None` when users already exist or no admin
/// password is configured.
pub async fn seed_admin(store: &dyn OrderStore, security: &SecurityConfig) -> Result<Option<User>, ApiError> {
    if store.count_users().await? > 0 {
        return Ok(None);
    }

    let Some(password) = security.admin_password.clone() else {
        warn!("No users exist and ADMIN_PASSWORD is not set; nobody can sign in");
        return Ok(None);
    };

    match register_user(store, security, &security.admin_username, password, Role::Admin).await {
        Ok(user) => Ok(Some(user)),
        Err(ApiError::ValidationError { .. }) => {
            warn!("ADMIN_PASSWORD is too short ({}); admin not seeded", PasswordError::TooShort);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::SqliteOrderStore;

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    #[tokio::test]
    async fn seeds_admin_only_once() {
        let store = SqliteOrderStore::in_memory().await.unwrap();
        let security = security();

        let seeded = seed_admin(&store, &security).await.unwrap().unwrap();
        assert_eq!(seeded.role, Role::Admin);
        assert_eq!(seeded.username, security.admin_username);

        assert!(seed_admin(&store, &security).await.unwrap().is_none());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn skips_seeding_without_password() {
        let store = SqliteOrderStore::in_memory().await.unwrap();
        let security = SecurityConfig { admin_password: None, ..security() };
        assert!(seed_admin(&store, &security).await.unwrap().is_none());
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn credentials_are_checked_against_hash() {
        let store = SqliteOrderStore::in_memory().await.unwrap();
        register_user(&store, &security(), "cashier", "pita-bread".to_string(), Role::User)
            .await
            .unwrap();

        let user = check_credentials(&store, "cashier", "pita-bread").await.unwrap();
        assert_eq!(user.role, Role::User);

        assert!(matches!(
            check_credentials(&store, "cashier", "wrong").await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            check_credentials(&store, "nobody", "pita-bread").await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let store = SqliteOrderStore::in_memory().await.unwrap();
        register_user(&store, &security(), "chef", "secret".to_string(), Role::User)
            .await
            .unwrap();
        let again = register_user(&store, &security(), "chef", "secret".to_string(), Role::User).await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }
}
