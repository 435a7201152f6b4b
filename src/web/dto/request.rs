//! Request DTOs for Web API.

use serde::Deserialize;

/// Query for `POST /api/actualize`.
#[derive(Debug, Default, Deserialize)]
pub struct ActualizeQuery {
    /// Per-source window; the configured default when omitted.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query for `GET /api/news`.
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    /// Category name.
    #[serde(default, rename = "type")]
    pub category: Option<String>,
    /// Maximum number of items.
    #[serde(default)]
    pub limit: Option<usize>,
}
