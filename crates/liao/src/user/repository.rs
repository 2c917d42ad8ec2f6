//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::User;

const USER_COLUMNS: &str = "id, username, phone, password_hash, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. The initial username is the phone number.
    #[instrument(skip(self, password_hash))]
    pub async fn create(&self, phone: &str, password_hash: &str) -> Result<User> {
        debug!("creating user for phone {phone}");

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (phone, username, password_hash)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(phone)
        .bind(phone)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .context("inserting user")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after creation"))
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("fetching user")
    }

    /// Get a user by phone number.
    pub async fn get_by_phone(&self, phone: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?"))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .context("fetching user by phone")
    }

    /// Get a user by login identifier (username or phone).
    pub async fn get_by_login(&self, login: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR phone = ?"
        ))
        .bind(login)
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .context("fetching user by login")
    }

    /// Check whether a phone number is registered.
    pub async fn exists_by_phone(&self, phone: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_one(&self.pool)
            .await
            .context("checking user existence")?;
        Ok(count > 0)
    }

    /// Replace the password hash for a phone number.
    ///
    /// Returns false when no user with that phone exists.
    #[instrument(skip(self, password_hash))]
    pub async fn update_password(&self, phone: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') WHERE phone = ?",
        )
        .bind(password_hash)
        .bind(phone)
        .execute(&self.pool)
        .await
        .context("updating password")?;

        Ok(result.rows_affected() > 0)
    }
}
