//! Test helpers for integration tests.
//!
//! Provides channel page builders, a scripted page fetcher, and a test
//! server wired to an in-memory database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_test::TestServer;
use tokio::net::TcpListener;

use newswire::config::{IngestConfig, SourceConfig};
use newswire::news::{IngestionOrchestrator, PageFetcher};
use newswire::web::{create_health_router, create_router, AppState};
use newswire::{Database, NewswireError, Result};

/// A post on a channel page.
pub struct PagePost {
    pub id: u32,
    pub text: Option<String>,
    pub link: bool,
}

impl PagePost {
    /// A complete post with text and a date link.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            text: Some(format!("Post number {}", id)),
            link: true,
        }
    }

    /// Remove the date link.
    pub fn without_link(mut self) -> Self {
        self.link = false;
        self
    }

    /// Remove the message body.
    pub fn without_text(mut self) -> Self {
        self.text = None;
        self
    }
}

/// Render a channel preview page for `handle` with the given posts,
/// oldest first.
pub fn channel_page(handle: &str, posts: &[PagePost]) -> String {
    let mut body = String::new();
    for post in posts {
        let id = post.id;
        body.push_str(&format!(
            r#"<div class="tgme_widget_message_wrap js-widget_message_wrap"><div class="tgme_widget_message js-widget_message" data-post="{handle}/{id}"><div class="tgme_widget_message_bubble">"#
        ));
        if let Some(text) = &post.text {
            body.push_str(&format!(
                r#"<div class="tgme_widget_message_text js-message_text" dir="auto">{text}</div>"#
            ));
        }
        if post.link {
            body.push_str(&format!(
                r#"<div class="tgme_widget_message_footer"><span class="tgme_widget_message_meta"><a class="tgme_widget_message_date" href="https://t.me/{handle}/{id}"><time datetime="2025-01-05T10:{id:02}:00+00:00" class="time">10:{id:02}</time></a></span></div>"#
            ));
        }
        body.push_str("</div></div></div>");
    }

    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>@{handle}</title></head><body><main class="tgme_main"><section class="tgme_channel_history js-message_history">{body}</section></main></body></html>"#
    )
}

/// Render a page of complete posts with the given ids.
pub fn simple_page(handle: &str, ids: &[u32]) -> String {
    let posts: Vec<PagePost> = ids.iter().map(|id| PagePost::new(*id)).collect();
    channel_page(handle, &posts)
}

/// Page fetcher serving scripted pages; unknown handles fail.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `handle`.
    pub fn set_page(&self, handle: &str, html: String) {
        self.pages.lock().unwrap().insert(handle.to_string(), html);
    }

    /// Make `handle` fail.
    pub fn remove_page(&self, handle: &str) {
        self.pages.lock().unwrap().remove(handle);
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, handle: &str) -> Result<String> {
        let page = self.pages.lock().unwrap().get(handle).cloned();
        page.ok_or_else(|| NewswireError::Fetch(format!("connection refused for {}", handle)))
    }
}

/// Build an ingest configuration for the given (category, handle) pairs.
pub fn ingest_config(sources: &[(&str, &str)]) -> IngestConfig {
    IngestConfig {
        sources: sources
            .iter()
            .map(|(category, handle)| SourceConfig::new(*category, *handle))
            .collect(),
        ..IngestConfig::default()
    }
}

/// Create a test server with an in-memory database and a scripted fetcher.
pub async fn create_test_server(
    config: &IngestConfig,
) -> (TestServer, Database, Arc<ScriptedFetcher>) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let fetcher = Arc::new(ScriptedFetcher::new());

    let orchestrator = IngestionOrchestrator::new(db.clone(), fetcher.clone(), config)
        .expect("Failed to create orchestrator");
    let app_state = Arc::new(AppState::new(db.clone(), orchestrator, config.clone()));

    let router = create_router(app_state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db, fetcher)
}

async fn serve_page(Path(handle): Path<String>) -> Response {
    match handle.as_str() {
        "down" => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
        "sport_h" => simple_page("sport_h", &[1, 2, 3]).into_response(),
        "tver_h" => channel_page(
            "tver_h",
            &[PagePost::new(10), PagePost::new(11).without_link(), PagePost::new(12)],
        )
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// Spawn a local preview host on a random port.
///
/// `/s/sport_h` has three posts, `/s/tver_h` has three posts of which the
/// middle one lacks a date link, and `/s/down` answers 503.
pub async fn spawn_preview_host() -> SocketAddr {
    let app = Router::new().route("/s/:handle", get(serve_page));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind preview host");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}
