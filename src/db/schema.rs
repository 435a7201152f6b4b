//! Database schema and migrations for newswire.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: News items ingested from channel preview pages
    r#"
CREATE TABLE news (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    category      TEXT NOT NULL,
    text          TEXT NOT NULL DEFAULT '',
    permalink     TEXT NOT NULL DEFAULT '',
    display_date  TEXT NOT NULL DEFAULT '',   -- free-form, as shown on the page
    ingested_at   TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: Permalink is the dedup key; empty permalinks are exempt
    r#"
CREATE UNIQUE INDEX idx_news_permalink ON news(permalink) WHERE permalink <> '';
CREATE INDEX idx_news_category_id ON news(category, id);
"#,
];
