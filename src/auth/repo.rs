pub use crate::auth::repo_types::User;
use sqlx::PgPool;
use uuid::Uuid;

impl User {
    /// Find a user by email. Absence is `None`, never an error.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by username (case-sensitive exact match).
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with a hashed password. A lost race against a
    /// concurrent signup surfaces here as a unique-violation error.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
