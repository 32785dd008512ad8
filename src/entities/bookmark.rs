use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A saved content item, unique per (user, type, slug)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub slug: String,
    pub title: String,
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
}

/// Bookmark creation payload
#[derive(Debug, Deserialize)]
pub struct NewBookmark {
    #[serde(rename = "type")]
    pub kind: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub cover_image: String,
}

impl Bookmark {
    /// Insert a bookmark; inserting the same (user, type, slug) twice is a no-op
    pub async fn insert(pool: &SqlitePool, user_id: i64, new: &NewBookmark) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookmarks (user_id, type, slug, title, cover_image)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (user_id, type, slug) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&new.kind)
        .bind(&new.slug)
        .bind(&new.title)
        .bind(&new.cover_image)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<Bookmark>> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, user_id, type, slug, title, cover_image, created_at
            FROM bookmarks
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a bookmark owned by the user; deleting another user's bookmark
    /// silently does nothing
    pub async fn delete_for_user(pool: &SqlitePool, user_id: i64, id: i64) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
