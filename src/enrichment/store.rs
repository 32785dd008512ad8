use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{enrichment::EnrichedFields, upstream::MediaKind};

/// Durable enrichment row, one per (title, media_type)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EnrichedRecord {
    pub id: i64,
    pub title: String,
    pub media_type: String,
    pub slug: String,
    pub author: String,
    pub genre: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub media_format: String,
    pub rating: String,
    pub status: String,
    pub release_year: String,
    pub synopsis: String,
    pub source: String,
    pub last_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl EnrichedRecord {
    pub fn into_fields(self) -> EnrichedFields {
        EnrichedFields {
            year: self.release_year,
            rating: self.rating,
            synopsis: self.synopsis,
            status: self.status,
            author: self.author,
            genre: self.genre,
        }
    }
}

/// Payload for an enrichment upsert
#[derive(Debug, Clone, Default)]
pub struct NewEnrichedRecord {
    pub title: String,
    pub media_type: String,
    pub slug: String,
    pub author: String,
    pub genre: String,
    pub media_format: String,
    pub rating: String,
    pub status: String,
    pub release_year: String,
    pub synopsis: String,
    pub source: String,
}

impl NewEnrichedRecord {
    pub fn from_fields(title: &str, kind: MediaKind, fields: &EnrichedFields) -> Self {
        Self {
            title: title.to_string(),
            media_type: kind.to_string(),
            author: fields.author.clone(),
            genre: fields.genre.clone(),
            rating: fields.rating.clone(),
            status: fields.status.clone(),
            release_year: fields.year.clone(),
            synopsis: fields.synopsis.clone(),
            source: "ai-generated".to_string(),
            ..Default::default()
        }
    }
}

/// Lookup/upsert capability the enrichment engine depends on. Passed as an
/// optional dependency when no durable store is configured.
#[async_trait]
pub trait EnrichmentStore: Send + Sync {
    async fn fetch(&self, title: &str, kind: MediaKind) -> anyhow::Result<Option<EnrichedRecord>>;

    async fn upsert(&self, record: &NewEnrichedRecord) -> anyhow::Result<()>;
}

/// SQLite-backed enrichment store
pub struct SqliteEnrichmentStore {
    pool: SqlitePool,
}

impl SqliteEnrichmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrichmentStore for SqliteEnrichmentStore {
    async fn fetch(&self, title: &str, kind: MediaKind) -> anyhow::Result<Option<EnrichedRecord>> {
        let record = sqlx::query_as::<_, EnrichedRecord>(
            r#"
            SELECT id, title, media_type, slug, author, genre, type, rating, status,
                   release_year, synopsis, source, last_updated_at, created_at
            FROM enriched_metadata
            WHERE title = ?1 AND media_type = ?2
            LIMIT 1
            "#,
        )
        .bind(title)
        .bind(kind.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Field-wise merge on conflict: an incoming empty value never overwrites
    /// a stored non-empty one, a non-empty incoming value always wins.
    async fn upsert(&self, record: &NewEnrichedRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO enriched_metadata
                (title, media_type, slug, author, genre, type, rating, status,
                 release_year, synopsis, source)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (title, media_type)
            DO UPDATE SET
                slug = excluded.slug,
                author = COALESCE(NULLIF(excluded.author, ''), enriched_metadata.author),
                genre = COALESCE(NULLIF(excluded.genre, ''), enriched_metadata.genre),
                type = COALESCE(NULLIF(excluded.type, ''), enriched_metadata.type),
                rating = COALESCE(NULLIF(excluded.rating, ''), enriched_metadata.rating),
                status = COALESCE(NULLIF(excluded.status, ''), enriched_metadata.status),
                release_year = COALESCE(NULLIF(excluded.release_year, ''), enriched_metadata.release_year),
                synopsis = COALESCE(NULLIF(excluded.synopsis, ''), enriched_metadata.synopsis),
                source = excluded.source,
                last_updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.title)
        .bind(&record.media_type)
        .bind(&record.slug)
        .bind(&record.author)
        .bind(&record.genre)
        .bind(&record.media_format)
        .bind(&record.rating)
        .bind(&record.status)
        .bind(&record.release_year)
        .bind(&record.synopsis)
        .bind(&record.source)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
