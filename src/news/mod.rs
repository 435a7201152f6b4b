//! Channel news module for newswire.
//!
//! This module provides the ingestion pipeline (fetch, extract, dedup,
//! persist) and the news read interface.

pub mod dedup;
pub mod extractor;
pub mod fetcher;
pub mod ingest;
pub mod repository;
pub mod types;

pub use dedup::{DedupGate, Verdict};
pub use extractor::PostExtractor;
pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use ingest::IngestionOrchestrator;
pub use repository::{NewsBatch, NewsRepository};
pub use types::{
    Extracted, IngestSummary, NewNewsItem, NewsItem, RawPost, SourceReport, DEFAULT_WINDOW,
    MAX_LIST_LIMIT,
};
