use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Registered account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        password_hash: &str,
    ) -> sqlx::Result<i64> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?1, ?2)")
            .bind(username)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_username(pool: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }
}

/// Opaque bearer-token session
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a new session token for a user
    pub async fn create(pool: &SqlitePool, user_id: i64) -> sqlx::Result<String> {
        let token = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?1, ?2)")
            .bind(&token)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(token)
    }

    /// Resolve a token to its user id
    pub async fn find_user(pool: &SqlitePool, token: &str) -> sqlx::Result<Option<i64>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, created_at FROM sessions WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(session.map(|s| s.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        pool
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let pool = memory_pool().await;

        let id = User::create(&pool, "ayomi", "hash").await.unwrap();
        let user = User::find_by_username(&pool, "ayomi").await.unwrap().unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "hash");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let pool = memory_pool().await;

        User::create(&pool, "ayomi", "hash").await.unwrap();

        assert!(User::create(&pool, "ayomi", "hash").await.is_err());
    }

    #[tokio::test]
    async fn session_resolves_to_its_user() {
        let pool = memory_pool().await;

        let id = User::create(&pool, "ayomi", "hash").await.unwrap();
        let token = Session::create(&pool, id).await.unwrap();

        assert_eq!(Session::find_user(&pool, &token).await.unwrap(), Some(id));
        assert_eq!(Session::find_user(&pool, "bogus").await.unwrap(), None);
    }
}
