//! News read handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::news::{NewsRepository, MAX_LIST_LIMIT};
use crate::web::dto::{ChannelResponse, NewsListResponse, NewsQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/news?type=<category> - List the newest items of a category.
pub async fn list_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsListResponse>, ApiError> {
    let category = query
        .category
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::unprocessable("Missing query parameter: type"))?;

    if !state.ingest.has_category(&category) {
        return Err(ApiError::not_found(format!(
            "Channel '{}' not found",
            category
        )));
    }

    let limit = match query.limit {
        None => MAX_LIST_LIMIT,
        Some(0) => return Err(ApiError::unprocessable("limit must be at least 1")),
        Some(limit) => limit.min(MAX_LIST_LIMIT),
    };

    let repo = NewsRepository::new(state.db.pool());
    let items = repo.list_by_category(&category, limit).await?;

    Ok(Json(NewsListResponse::new(category, items)))
}

/// GET /api/channels - List configured channels in mapping order.
pub async fn list_channels(State(state): State<Arc<AppState>>) -> Json<Vec<ChannelResponse>> {
    Json(state.ingest.sources.iter().map(ChannelResponse::from).collect())
}
