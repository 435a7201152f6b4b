//! Ingestion orchestrator for newswire.
//!
//! One pass fetches and extracts every configured source on a bounded pool
//! of futures, then writes each source in mapping order through its own
//! transaction. A failing source is reported and skipped; it never aborts
//! the pass.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::dedup::{DedupGate, Verdict};
use super::extractor::PostExtractor;
use super::fetcher::{HttpPageFetcher, PageFetcher};
use super::repository::NewsRepository;
use super::types::{IngestSummary, NewNewsItem, RawPost, SourceReport};
use crate::config::{IngestConfig, SourceConfig};
use crate::db::Database;
use crate::Result;

/// Counts for one committed source batch.
#[derive(Debug, Default)]
struct BatchCounts {
    added: usize,
    duplicates: usize,
    skipped: usize,
}

/// Drives ingestion passes over the configured sources.
pub struct IngestionOrchestrator {
    db: Database,
    fetcher: Arc<dyn PageFetcher>,
    extractor: PostExtractor,
    gate: DedupGate,
    sources: Vec<SourceConfig>,
    default_window: usize,
    max_concurrent_fetches: usize,
}

impl IngestionOrchestrator {
    /// Create an orchestrator with a custom page fetcher.
    pub fn new(db: Database, fetcher: Arc<dyn PageFetcher>, config: &IngestConfig) -> Result<Self> {
        Ok(Self {
            db,
            fetcher,
            extractor: PostExtractor::new()?,
            gate: DedupGate::new(config.skip_missing_permalink),
            sources: config.sources.clone(),
            default_window: config.window,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        })
    }

    /// Create an orchestrator that fetches over HTTP.
    pub fn from_config(db: Database, config: &IngestConfig) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(config)?;
        Self::new(db, Arc::new(fetcher), config)
    }

    /// Configured sources, in mapping order.
    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Window used when a pass is run without one.
    pub fn default_window(&self) -> usize {
        self.default_window
    }

    /// Run one pass over every source.
    ///
    /// `window` caps the number of most recent posts taken per source and
    /// falls back to the configured default.
    pub async fn run_pass(&self, window: Option<usize>) -> IngestSummary {
        let window = window.unwrap_or(self.default_window);
        info!(
            sources = self.sources.len(),
            window, "Starting ingestion pass"
        );

        let mut pages = stream::iter(self.sources.clone())
            .map(|source| async move {
                let fetched = self.fetch_posts(&source, window).await;
                (source, fetched)
            })
            .buffered(self.max_concurrent_fetches)
            .boxed();

        let mut reports = Vec::with_capacity(self.sources.len());
        while let Some((source, fetched)) = pages.next().await {
            let report = match fetched {
                Ok(posts) => self.ingest_source(&source, posts).await,
                Err(e) => {
                    warn!(
                        category = %source.category,
                        handle = %source.handle,
                        error = %e,
                        "Failed to fetch source"
                    );
                    let mut report = SourceReport::new(&source.category, &source.handle);
                    report.error = Some(e.to_string());
                    report
                }
            };
            reports.push(report);
        }

        let summary = IngestSummary::from_reports(reports);
        info!(
            added = summary.added,
            failed = summary.failed_count(),
            "Ingestion pass finished"
        );
        summary
    }

    async fn fetch_posts(&self, source: &SourceConfig, window: usize) -> Result<Vec<RawPost>> {
        let html = self.fetcher.fetch(&source.handle).await?;
        let posts = self.extractor.extract(&html, window);
        debug!(
            category = %source.category,
            handle = %source.handle,
            posts = posts.len(),
            "Extracted posts"
        );
        Ok(posts)
    }

    async fn ingest_source(&self, source: &SourceConfig, posts: Vec<RawPost>) -> SourceReport {
        let mut report = SourceReport::new(&source.category, &source.handle);
        report.fetched = posts.len();

        match self.persist(&source.category, posts).await {
            Ok(counts) => {
                report.added = counts.added;
                report.duplicates = counts.duplicates;
                report.skipped = counts.skipped;
                info!(
                    category = %source.category,
                    handle = %source.handle,
                    added = counts.added,
                    duplicates = counts.duplicates,
                    skipped = counts.skipped,
                    "Source ingested"
                );
            }
            Err(e) => {
                warn!(
                    category = %source.category,
                    handle = %source.handle,
                    error = %e,
                    "Failed to store source batch"
                );
                report.error = Some(e.to_string());
            }
        }

        report
    }

    /// Write new posts of one source in extraction order, as one transaction.
    async fn persist(&self, category: &str, posts: Vec<RawPost>) -> Result<BatchCounts> {
        let repo = NewsRepository::new(self.db.pool());
        let mut batch = repo.begin_batch().await?;
        let mut counts = BatchCounts::default();

        for post in posts {
            match self.gate.check(&mut batch, &post).await? {
                Verdict::Known => counts.duplicates += 1,
                Verdict::MissingPermalink => counts.skipped += 1,
                Verdict::New => {
                    let item = NewNewsItem::from_post(category, post);
                    // A concurrent pass may have stored it since the check.
                    if batch.insert_or_ignore(&item).await?.is_none() {
                        counts.duplicates += 1;
                    }
                }
            }
        }

        counts.added = batch.inserted();
        batch.commit().await?;
        Ok(counts)
    }
}
