//! API handlers for the newswire HTTP API.

pub mod ingest;
pub mod news;

pub use ingest::*;
pub use news::*;

use crate::config::IngestConfig;
use crate::db::Database;
use crate::news::IngestionOrchestrator;
use crate::Result;

/// Application state shared across handlers.
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Runs ingestion passes.
    pub orchestrator: IngestionOrchestrator,
    /// Ingestion settings (sources, window bounds).
    pub ingest: IngestConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, orchestrator: IngestionOrchestrator, ingest: IngestConfig) -> Self {
        Self {
            db,
            orchestrator,
            ingest,
        }
    }

    /// Create a state whose orchestrator fetches over HTTP.
    pub fn from_config(db: Database, ingest: &IngestConfig) -> Result<Self> {
        let orchestrator = IngestionOrchestrator::from_config(db.clone(), ingest)?;
        Ok(Self::new(db, orchestrator, ingest.clone()))
    }
}
