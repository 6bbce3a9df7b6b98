//! # User Repository
//!
//! Identity lookups. Account administration is out of Taproom's hands; the
//! server only needs to resolve a session subject to a user and role.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use taproom_core::User;

/// Repository for user lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, role FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Inserts a user.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - Username already taken
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(username = %user.username, role = %user.role, "Inserting user");

        sqlx::query("INSERT INTO users (id, username, role) VALUES (?1, ?2, ?3)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(user.role)
            .execute(&self.pool)
            .await?;

        Ok(user.clone())
    }
}
