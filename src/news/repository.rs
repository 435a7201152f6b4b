//! News repository for newswire.
//!
//! Writes made during ingestion go through a [`NewsBatch`], one per source,
//! so that a source's items are committed together or not at all.

use chrono::Utc;
use sqlx::{Executor, Sqlite, Transaction};

use super::types::{NewNewsItem, NewsItem};
use crate::db::{parse_datetime, DbPool};
use crate::Result;

const BEGIN_BATCH: &str = "BEGIN IMMEDIATE";

const EXISTS_BY_PERMALINK: &str = "SELECT EXISTS(SELECT 1 FROM news WHERE permalink = $1)";

// The unique index on permalink turns a racing duplicate into a no-op.
const INSERT_OR_IGNORE: &str = r#"
    INSERT OR IGNORE INTO news (category, text, permalink, display_date, ingested_at)
    VALUES ($1, $2, $3, $4, $5)
"#;

/// Row type for news item from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct NewsItemRow {
    id: i64,
    category: String,
    text: String,
    permalink: String,
    display_date: String,
    ingested_at: String,
}

impl From<NewsItemRow> for NewsItem {
    fn from(row: NewsItemRow) -> Self {
        NewsItem {
            id: row.id,
            category: row.category,
            text: row.text,
            permalink: row.permalink,
            display_date: row.display_date,
            ingested_at: parse_datetime(&row.ingested_at).unwrap_or_else(Utc::now),
        }
    }
}

async fn exists_by_permalink<'e, E>(executor: E, permalink: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: i64 = sqlx::query_scalar(EXISTS_BY_PERMALINK)
        .bind(permalink)
        .fetch_one(executor)
        .await?;
    Ok(exists != 0)
}

async fn insert_or_ignore<'e, E>(executor: E, item: &NewNewsItem) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(INSERT_OR_IGNORE)
        .bind(&item.category)
        .bind(&item.text)
        .bind(&item.permalink)
        .bind(&item.display_date)
        .bind(Utc::now().to_rfc3339())
        .execute(executor)
        .await?;

    if result.rows_affected() > 0 {
        Ok(Some(result.last_insert_rowid()))
    } else {
        Ok(None) // Already existed
    }
}

/// Repository for news item operations.
pub struct NewsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> NewsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Begin a write batch for one source.
    ///
    /// The batch holds the database write lock from the start, so a second
    /// writer waits on the busy timeout instead of failing on lock upgrade.
    pub async fn begin_batch(&self) -> Result<NewsBatch> {
        Ok(NewsBatch {
            tx: self.pool.begin_with(BEGIN_BATCH).await?,
            inserted: 0,
        })
    }

    /// Check whether any item (in any category) has this permalink.
    pub async fn exists_by_permalink(&self, permalink: &str) -> Result<bool> {
        exists_by_permalink(self.pool, permalink).await
    }

    /// Insert a single item outside of a batch, ignoring duplicates.
    ///
    /// Returns the new ID, or `None` if the permalink is already stored.
    pub async fn insert_or_ignore(&self, item: &NewNewsItem) -> Result<Option<i64>> {
        insert_or_ignore(self.pool, item).await
    }

    /// Get an item by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<NewsItem>> {
        let row = sqlx::query_as::<_, NewsItemRow>(
            r#"
            SELECT id, category, text, permalink, display_date, ingested_at
            FROM news
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(NewsItem::from))
    }

    /// List items for a category (newest first).
    pub async fn list_by_category(&self, category: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let rows = sqlx::query_as::<_, NewsItemRow>(
            r#"
            SELECT id, category, text, permalink, display_date, ingested_at
            FROM news
            WHERE category = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(category)
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(NewsItem::from).collect())
    }

    /// Count items for a category.
    pub async fn count_by_category(&self, category: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM news WHERE category = $1")
            .bind(category)
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count all items.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM news")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }
}

/// A per-source write batch backed by one transaction.
///
/// Dropping a batch without calling [`NewsBatch::commit`] rolls it back.
pub struct NewsBatch {
    tx: Transaction<'static, Sqlite>,
    inserted: usize,
}

impl NewsBatch {
    /// Check whether any item has this permalink, including items written
    /// earlier in this batch.
    pub async fn exists_by_permalink(&mut self, permalink: &str) -> Result<bool> {
        exists_by_permalink(&mut *self.tx, permalink).await
    }

    /// Insert an item, ignoring duplicates.
    pub async fn insert_or_ignore(&mut self, item: &NewNewsItem) -> Result<Option<i64>> {
        let id = insert_or_ignore(&mut *self.tx, item).await?;
        if id.is_some() {
            self.inserted += 1;
        }
        Ok(id)
    }

    /// Number of items inserted in this batch so far.
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Commit every write in the batch.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard every write in the batch.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
