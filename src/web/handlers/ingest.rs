//! Ingestion trigger handler.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::news::IngestSummary;
use crate::web::dto::ActualizeQuery;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/actualize - Run one ingestion pass over every source.
///
/// Always answers with a summary once the pass completes; sources that
/// failed are listed with their error.
pub async fn actualize(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActualizeQuery>,
) -> Result<Json<IngestSummary>, ApiError> {
    let window = query
        .limit
        .map(|limit| state.ingest.check_window(limit))
        .transpose()?;

    let summary = state.orchestrator.run_pass(window).await;
    Ok(Json(summary))
}
