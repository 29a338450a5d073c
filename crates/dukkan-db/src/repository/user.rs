//! # User Repository
//!
//! Operator accounts and the login check.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_against_dummy, verify_password};
use crate::error::{DbError, DbResult};
use dukkan_core::validation::{validate_password, validate_username};
use dukkan_core::{AuthenticatedUser, CoreError, Role, User, DEFAULT_ADMIN_USERNAME};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role, created_at FROM users WHERE username = ?1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Creates an operator account. The password is hashed before storage.
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<User> {
        validate_username(username)?;
        validate_password(password)?;
        let username = username.trim();
        debug!(username = %username, role = role.as_str(), "Creating user");

        if self.get_by_username(username).await?.is_some() {
            return Err(DbError::duplicate("username", username));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, username, password, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        info!(id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `Domain(InvalidCredentials)`, after the same amount of hashing work.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<AuthenticatedUser> {
        let user = self.get_by_username(username).await?;

        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash),
            None => {
                verify_against_dummy(password);
                false
            }
        };

        match user {
            Some(user) if verified => {
                info!(user_id = %user.id, role = user.role.as_str(), "Login succeeded");
                Ok(AuthenticatedUser::from(&user))
            }
            _ => {
                warn!("Login failed");
                Err(CoreError::InvalidCredentials.into())
            }
        }
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Creates the default `admin` account when there are no users at all.
    /// Returns the account if one was created.
    pub async fn ensure_default_admin(&self, password: &str) -> DbResult<Option<User>> {
        if self.count().await? > 0 {
            return Ok(None);
        }

        info!("No users found, creating default administrator");
        let admin = self
            .create(DEFAULT_ADMIN_USERNAME, password, Role::Admin)
            .await?;
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let db = db().await;
        let created = db
            .users()
            .create("cashier1", "secret", Role::Cashier)
            .await
            .unwrap();

        let user = db.users().authenticate("cashier1", "secret").await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.role, Role::Cashier);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_identical() {
        let db = db().await;
        db.users().create("admin", "password", Role::Admin).await.unwrap();

        let wrong = db.users().authenticate("admin", "nope").await.unwrap_err();
        let unknown = db.users().authenticate("ghost", "password").await.unwrap_err();

        assert!(matches!(wrong, DbError::Domain(CoreError::InvalidCredentials)));
        assert!(matches!(unknown, DbError::Domain(CoreError::InvalidCredentials)));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_password_stored_hashed() {
        let db = db().await;
        db.users().create("admin", "password", Role::Admin).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = 'admin'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_ne!(stored, "password");
        assert!(stored.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = db().await;
        db.users().create("sam", "secret", Role::Cashier).await.unwrap();
        let err = db.users().create("sam", "other1", Role::Admin).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_ensure_default_admin_only_once() {
        let db = db().await;
        let first = db.users().ensure_default_admin("password").await.unwrap();
        assert_eq!(first.unwrap().username, "admin");

        let second = db.users().ensure_default_admin("password").await.unwrap();
        assert!(second.is_none());
        assert_eq!(db.users().count().await.unwrap(), 1);

        let admin = db.users().authenticate("admin", "password").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
