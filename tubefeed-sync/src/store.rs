use std::fs;
use std::path::PathBuf;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;
use tubefeed_core::Envelope;

use crate::merge::merge_envelopes;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XDG data directory is unavailable")]
    MissingDataDir,
    #[error("record not found after upsert")]
    MissingRecord,
}

/// The cache's unit of storage: one enriched video, keyed by its
/// content id. Descriptive fields are replaced on every merge;
/// `favorite` and `playback_position` belong to the user and survive
/// remote updates.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
    pub thumbnail_url: String,
    pub view_count: String,
    pub like_count: String,
    pub duration: String,
    pub favorite: bool,
    pub playback_position: f64,
}

pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    pub async fn new_default() -> Result<Self, StoreError> {
        let db_path = default_db_path()?;
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Merge a (listing, detail) envelope pair into the cache.
    /// Descriptive fields are replaced for rows that already exist;
    /// `favorite` and `playback_position` are absent from the update
    /// list, so an existing row keeps them. Returns the records that
    /// were written, read back from the store.
    pub async fn upsert_merge(
        &self,
        listing: &Envelope,
        detail: &Envelope,
    ) -> Result<Vec<VideoRecord>, StoreError> {
        let candidates = merge_envelopes(listing, detail);
        let mut written = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            sqlx::query(
                "INSERT INTO videos (
                    video_id,
                    title,
                    published_at,
                    thumbnail_url,
                    view_count,
                    like_count,
                    duration
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(video_id) DO UPDATE SET
                    title = excluded.title,
                    published_at = excluded.published_at,
                    thumbnail_url = excluded.thumbnail_url,
                    view_count = excluded.view_count,
                    like_count = excluded.like_count,
                    duration = excluded.duration;
                ",
            )
            .bind(&candidate.video_id)
            .bind(&candidate.title)
            .bind(&candidate.published_at)
            .bind(&candidate.thumbnail_url)
            .bind(&candidate.view_count)
            .bind(&candidate.like_count)
            .bind(&candidate.duration)
            .execute(&self.pool)
            .await?;

            written.push(
                self.get(&candidate.video_id)
                    .await?
                    .ok_or(StoreError::MissingRecord)?,
            );
        }
        debug!(written = written.len(), "merged page into cache");
        Ok(written)
    }

    /// The merge algorithm without the writes: search results are
    /// presentation-only and must not end up in the persistent cache.
    pub fn convert_ephemeral(listing: &Envelope, detail: &Envelope) -> Vec<VideoRecord> {
        merge_envelopes(listing, detail)
    }

    pub async fn get(&self, video_id: &str) -> Result<Option<VideoRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT video_id, title, published_at, thumbnail_url, view_count, like_count, duration, favorite, playback_position FROM videos WHERE video_id = ?1",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(map_record(&row)?))
    }

    /// Case-insensitive substring match on the title, newest first.
    /// The ordering is a contract: callers page through matches in
    /// reading order.
    pub async fn search(&self, needle: &str) -> Result<Vec<VideoRecord>, StoreError> {
        let pattern = format!("%{needle}%");
        let rows = sqlx::query(
            "SELECT video_id, title, published_at, thumbnail_url, view_count, like_count, duration, favorite, playback_position
             FROM videos
             WHERE title LIKE ?1
             ORDER BY published_at DESC",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_record).collect()
    }

    pub async fn list_all(&self) -> Result<Vec<VideoRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT video_id, title, published_at, thumbnail_url, view_count, like_count, duration, favorite, playback_position
             FROM videos
             ORDER BY published_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_record).collect()
    }

    pub async fn favorites(&self) -> Result<Vec<VideoRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT video_id, title, published_at, thumbnail_url, view_count, like_count, duration, favorite, playback_position
             FROM videos
             WHERE favorite = 1
             ORDER BY published_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_record).collect()
    }

    /// Record a playback position. Unknown ids are discarded silently;
    /// a position update for a video the cache has forgotten is not an
    /// error.
    pub async fn mark_position(&self, video_id: &str, seconds: f64) -> Result<(), StoreError> {
        sqlx::query("UPDATE videos SET playback_position = ?1 WHERE video_id = ?2")
            .bind(seconds)
            .bind(video_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Same discard-on-unknown semantics as `mark_position`.
    pub async fn set_favorite(&self, video_id: &str, favorite: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE videos SET favorite = ?1 WHERE video_id = ?2")
            .bind(if favorite { 1 } else { 0 })
            .bind(video_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM videos")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

fn map_record(row: &SqliteRow) -> Result<VideoRecord, StoreError> {
    let favorite: i64 = row.try_get("favorite")?;
    Ok(VideoRecord {
        video_id: row.try_get("video_id")?,
        title: row.try_get("title")?,
        published_at: row.try_get("published_at")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        view_count: row.try_get("view_count")?,
        like_count: row.try_get("like_count")?,
        duration: row.try_get("duration")?,
        favorite: favorite != 0,
        playback_position: row.try_get("playback_position")?,
    })
}

fn default_db_path() -> Result<PathBuf, StoreError> {
    let base = dirs::data_dir().ok_or(StoreError::MissingDataDir)?;
    Ok(base.join("tubefeed").join("catalog.db"))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
