//! Post extraction from channel preview markup.
//!
//! Post containers are taken in document order, which the preview page
//! renders oldest first. Each field is extracted independently; a missing
//! sub-element yields [`Extracted::Absent`] for that field only.

use scraper::{ElementRef, Html, Selector};

use crate::error::{NewswireError, Result};
use crate::news::types::{Extracted, RawPost};

/// Selector for one post container.
const POST_SELECTOR: &str = ".tgme_widget_message";

/// Selector for the message body inside a post.
const TEXT_SELECTOR: &str = ".tgme_widget_message_text";

/// Selector for the canonical date link inside a post.
const DATE_LINK_SELECTOR: &str = "a.tgme_widget_message_date";

/// Extracts [`RawPost`]s from preview page markup.
#[derive(Debug, Clone)]
pub struct PostExtractor {
    post: Selector,
    text: Selector,
    date_link: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| NewswireError::Config(format!("invalid selector {:?}: {}", css, e)))
}

impl PostExtractor {
    /// Create an extractor for the channel preview page layout.
    pub fn new() -> Result<Self> {
        Ok(Self {
            post: selector(POST_SELECTOR)?,
            text: selector(TEXT_SELECTOR)?,
            date_link: selector(DATE_LINK_SELECTOR)?,
        })
    }

    /// Extract the newest `limit` posts, oldest of the window first.
    ///
    /// Returns an empty vector when the document has no post containers.
    pub fn extract(&self, html: &str, limit: usize) -> Vec<RawPost> {
        let document = Html::parse_document(html);
        let containers: Vec<ElementRef<'_>> = document.select(&self.post).collect();
        let start = containers.len().saturating_sub(limit);

        containers[start..]
            .iter()
            .map(|container| self.extract_post(*container))
            .collect()
    }

    fn extract_post(&self, container: ElementRef<'_>) -> RawPost {
        let text = container
            .select(&self.text)
            .next()
            .map(|body| Extracted::from_text(body.text().collect::<Vec<_>>().join("\n").trim()))
            .unwrap_or(Extracted::Absent);

        let date_link = container.select(&self.date_link).next();

        let permalink = date_link
            .and_then(|link| link.value().attr("href"))
            .map(|href| Extracted::from_text(href.trim()))
            .unwrap_or(Extracted::Absent);

        let display_date = date_link
            .map(|link| Extracted::from_text(link.text().collect::<String>().trim()))
            .unwrap_or(Extracted::Absent);

        RawPost {
            text,
            permalink,
            display_date,
        }
    }
}
