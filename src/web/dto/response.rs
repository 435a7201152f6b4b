//! Response DTOs for Web API.

use serde::Serialize;

use crate::config::SourceConfig;
use crate::news::NewsItem;

/// One news item as returned by `GET /api/news`.
#[derive(Debug, Serialize)]
pub struct NewsItemResponse {
    /// Item ID.
    pub id: i64,
    /// Message text.
    pub text: String,
    /// Permalink to the original post.
    pub link: String,
    /// Display date as shown on the source page.
    pub date: String,
    /// Ingestion timestamp (RFC 3339).
    pub created_at: String,
}

impl From<NewsItem> for NewsItemResponse {
    fn from(item: NewsItem) -> Self {
        Self {
            id: item.id,
            text: item.text,
            link: item.permalink,
            date: item.display_date,
            created_at: item.ingested_at.to_rfc3339(),
        }
    }
}

/// News list for one category.
#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    /// Category name.
    pub channel: String,
    /// Number of items returned.
    pub count: usize,
    /// Items, newest first.
    pub items: Vec<NewsItemResponse>,
}

impl NewsListResponse {
    /// Build a list response from stored items.
    pub fn new(channel: impl Into<String>, items: Vec<NewsItem>) -> Self {
        let items: Vec<NewsItemResponse> = items.into_iter().map(Into::into).collect();
        Self {
            channel: channel.into(),
            count: items.len(),
            items,
        }
    }
}

/// A configured channel.
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    /// Category name.
    pub category: String,
    /// Channel handle.
    pub handle: String,
}

impl From<&SourceConfig> for ChannelResponse {
    fn from(source: &SourceConfig) -> Self {
        Self {
            category: source.category.clone(),
            handle: source.handle.clone(),
        }
    }
}
