//! News types for newswire.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default number of most recent posts taken per source per pass.
pub const DEFAULT_WINDOW: usize = 50;

/// Default and maximum number of items returned by the read interface.
pub const MAX_LIST_LIMIT: usize = 50;

/// Outcome of extracting one field from a post container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    /// The sub-element was found and yielded a non-empty value.
    Present(T),
    /// The sub-element was missing or empty.
    Absent,
}

impl<T> Extracted<T> {
    /// Convert to an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Extracted::Present(v) => Some(v),
            Extracted::Absent => None,
        }
    }
}

impl<T: Default> Extracted<T> {
    /// Take the value, or the type's default when absent.
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

impl Extracted<String> {
    /// Build from raw text, treating empty or whitespace-only text as absent.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Extracted::Absent
        } else {
            Extracted::Present(text)
        }
    }

    /// View the value as a string slice, empty when absent.
    pub fn as_str(&self) -> &str {
        match self {
            Extracted::Present(v) => v.as_str(),
            Extracted::Absent => "",
        }
    }
}

/// A post as found on a channel preview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    /// Message body text, lines joined with `\n`.
    pub text: Extracted<String>,
    /// Canonical link to the post (the dedup key).
    pub permalink: Extracted<String>,
    /// Visible date text of the post's date link.
    pub display_date: Extracted<String>,
}

/// A stored news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    /// Item ID.
    pub id: i64,
    /// Category the item was ingested under.
    pub category: String,
    /// Message text.
    pub text: String,
    /// Canonical link to the original post.
    pub permalink: String,
    /// Free-form date as shown on the source page.
    pub display_date: String,
    /// When the item was written to the store.
    pub ingested_at: DateTime<Utc>,
}

/// New news item for creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNewsItem {
    /// Category name.
    pub category: String,
    /// Message text.
    pub text: String,
    /// Canonical link to the original post.
    pub permalink: String,
    /// Free-form display date.
    pub display_date: String,
}

impl NewNewsItem {
    /// Create a new item with empty text and date.
    pub fn new(category: impl Into<String>, permalink: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: String::new(),
            permalink: permalink.into(),
            display_date: String::new(),
        }
    }

    /// Build an item from an extracted post.
    ///
    /// Absent fields become empty strings.
    pub fn from_post(category: impl Into<String>, post: RawPost) -> Self {
        Self {
            category: category.into(),
            text: post.text.unwrap_or_default(),
            permalink: post.permalink.unwrap_or_default(),
            display_date: post.display_date.unwrap_or_default(),
        }
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the display date.
    pub fn with_display_date(mut self, display_date: impl Into<String>) -> Self {
        self.display_date = display_date.into();
        self
    }
}

/// Per-source result of one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    /// Category name.
    pub category: String,
    /// Channel handle.
    pub handle: String,
    /// Posts extracted from the page (after windowing).
    pub fetched: usize,
    /// Posts written to the store.
    pub added: usize,
    /// Posts already known to the store.
    pub duplicates: usize,
    /// Posts dropped because their permalink was missing.
    pub skipped: usize,
    /// Error that stopped this source, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceReport {
    /// Create an empty report for a source.
    pub fn new(category: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            handle: handle.into(),
            ..Self::default()
        }
    }

    /// Check whether the source failed.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of one full ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// True when the pass ran to completion (individual sources may have failed).
    pub success: bool,
    /// Total items written across all sources.
    pub added: usize,
    /// Per-source reports, in mapping order.
    pub sources: Vec<SourceReport>,
}

impl IngestSummary {
    /// Build a summary from per-source reports.
    pub fn from_reports(sources: Vec<SourceReport>) -> Self {
        let added = sources.iter().map(|s| s.added).sum();
        Self {
            success: true,
            added,
            sources,
        }
    }

    /// Number of sources that failed.
    pub fn failed_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_failed()).count()
    }
}
