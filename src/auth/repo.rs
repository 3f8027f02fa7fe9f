use crate::auth::repo_types::User;
use sqlx::{Executor, Sqlite};

impl User {
    /// Find a user by (already normalised) email.
    pub async fn find_by_email<'e, E>(db: E, email: &str) -> Result<Option<User>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, points, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password and zero points.
    pub async fn create<'e, E>(db: E, email: &str, password_hash: &str) -> Result<User, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (?, ?)
            RETURNING id, email, password_hash, points, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}
