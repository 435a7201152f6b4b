//! newswire - channel news ingestion service
//!
//! Pulls the public preview pages of configured channels, stores posts that
//! are new, and serves them over a small HTTP API.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod news;
pub mod web;

pub use config::{Config, IngestConfig, SourceConfig};
pub use db::Database;
pub use error::{NewswireError, Result};
pub use news::{
    IngestSummary, IngestionOrchestrator, NewsItem, NewsRepository, PageFetcher, SourceReport,
};
pub use web::WebServer;
