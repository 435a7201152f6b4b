//! Deduplication gate.
//!
//! The permalink is the only dedup key and is checked globally, so a post
//! already stored under one category is rejected for every other category.

use super::repository::NewsBatch;
use super::types::{Extracted, RawPost};
use crate::Result;

/// Decision for one candidate post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not yet stored.
    New,
    /// Already stored.
    Known,
    /// No permalink was extracted and the skip policy is on.
    MissingPermalink,
}

impl Verdict {
    /// Check if the post should be written.
    pub fn is_new(&self) -> bool {
        matches!(self, Verdict::New)
    }
}

/// Decides whether an extracted post is new to the store.
#[derive(Debug, Clone, Copy)]
pub struct DedupGate {
    skip_missing_permalink: bool,
}

impl DedupGate {
    /// Create a gate. With `skip_missing_permalink` set, posts without a
    /// permalink are turned away instead of stored.
    pub fn new(skip_missing_permalink: bool) -> Self {
        Self {
            skip_missing_permalink,
        }
    }

    /// Check a candidate against the store, seeing earlier writes of the
    /// same batch.
    ///
    /// Posts without a permalink cannot be matched, so with the skip policy
    /// off they are always new.
    pub async fn check(&self, batch: &mut NewsBatch, post: &RawPost) -> Result<Verdict> {
        match &post.permalink {
            Extracted::Absent if self.skip_missing_permalink => Ok(Verdict::MissingPermalink),
            Extracted::Absent => Ok(Verdict::New),
            Extracted::Present(permalink) => {
                if batch.exists_by_permalink(permalink).await? {
                    Ok(Verdict::Known)
                } else {
                    Ok(Verdict::New)
                }
            }
        }
    }
}

impl Default for DedupGate {
    fn default() -> Self {
        Self::new(true)
    }
}
