//! Channel preview page fetcher.
//!
//! Retrieves the public preview page of one channel over HTTP with a
//! bounded timeout, a fixed browser-like user agent, and a size limit.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::{is_valid_handle, IngestConfig};
use crate::error::{NewswireError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Source of raw channel page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the preview page for `handle` and return the document body.
    async fn fetch(&self, handle: &str) -> Result<String>;
}

/// Page fetcher backed by reqwest.
pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
    max_page_size: u64,
}

impl HttpPageFetcher {
    /// Create a new fetcher from the ingest configuration.
    pub fn new(config: &IngestConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| NewswireError::Config(format!("invalid base URL: {}", e)))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| NewswireError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_page_size: config.max_page_size_bytes,
        })
    }

    /// Build the preview page address for a channel handle.
    pub fn page_url(&self, handle: &str) -> Result<Url> {
        if !is_valid_handle(handle) {
            return Err(NewswireError::Validation(format!(
                "invalid channel handle: {:?}",
                handle
            )));
        }
        Url::parse(&format!("{}/s/{}", self.base_url, handle))
            .map_err(|e| NewswireError::Fetch(format!("invalid page URL: {}", e)))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, handle: &str) -> Result<String> {
        let url = self.page_url(handle)?;
        tracing::debug!(%url, "fetching channel page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                NewswireError::Fetch(format!("request timed out: {}", e))
            } else {
                NewswireError::Fetch(format!("failed to fetch page: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(NewswireError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_page_size {
                return Err(NewswireError::Fetch(format!(
                    "page too large: {} bytes (max {} bytes)",
                    content_length, self.max_page_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NewswireError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_page_size {
            return Err(NewswireError::Fetch(format!(
                "page too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_page_size
            )));
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{header::USER_AGENT, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn page(Path(handle): Path<String>, headers: HeaderMap) -> Response {
        match handle.as_str() {
            "missing" => (StatusCode::NOT_FOUND, "no such channel").into_response(),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late".into_response()
            }
            "huge" => "x".repeat(4096).into_response(),
            _ => {
                let agent = headers
                    .get(USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                format!("<html><body><p id=\"{}\">{}</p></body></html>", handle, agent)
                    .into_response()
            }
        }
    }

    async fn spawn_page_server() -> SocketAddr {
        let app = Router::new().route("/s/:handle", get(page));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn test_config(addr: SocketAddr) -> IngestConfig {
        IngestConfig {
            base_url: format!("http://{}", addr),
            user_agent: "TestBrowser/1.0".to_string(),
            timeout_secs: 1,
            connect_timeout_secs: 1,
            max_page_size_bytes: 1024,
            ..IngestConfig::default()
        }
    }

    #[test]
    fn test_page_url() {
        let fetcher = HttpPageFetcher::new(&IngestConfig::default()).unwrap();
        let url = fetcher.page_url("tver_today").unwrap();
        assert_eq!(url.as_str(), "https://t.me/s/tver_today");
    }

    #[test]
    fn test_page_url_trailing_slash_base() {
        let config = IngestConfig {
            base_url: "https://mirror.example.com/".to_string(),
            ..IngestConfig::default()
        };
        let fetcher = HttpPageFetcher::new(&config).unwrap();
        let url = fetcher.page_url("h1").unwrap();
        assert_eq!(url.as_str(), "https://mirror.example.com/s/h1");
    }

    #[test]
    fn test_page_url_rejects_bad_handle() {
        let fetcher = HttpPageFetcher::new(&IngestConfig::default()).unwrap();
        assert!(matches!(
            fetcher.page_url("../admin"),
            Err(NewswireError::Validation(_))
        ));
        assert!(fetcher.page_url("").is_err());
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let config = IngestConfig {
            base_url: "::not a url::".to_string(),
            ..IngestConfig::default()
        };
        assert!(matches!(
            HttpPageFetcher::new(&config),
            Err(NewswireError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let addr = spawn_page_server().await;
        let fetcher = HttpPageFetcher::new(&test_config(addr)).unwrap();

        let body = fetcher.fetch("h1").await.unwrap();
        assert!(body.contains("id=\"h1\""));
        assert!(body.contains("TestBrowser/1.0"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let addr = spawn_page_server().await;
        let fetcher = HttpPageFetcher::new(&test_config(addr)).unwrap();

        let err = fetcher.fetch("missing").await.unwrap_err();
        assert!(matches!(err, NewswireError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let addr = spawn_page_server().await;
        let fetcher = HttpPageFetcher::new(&test_config(addr)).unwrap();

        let err = fetcher.fetch("slow").await.unwrap_err();
        assert!(matches!(err, NewswireError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_fetch_too_large() {
        let addr = spawn_page_server().await;
        let fetcher = HttpPageFetcher::new(&test_config(addr)).unwrap();

        let err = fetcher.fetch("huge").await.unwrap_err();
        assert!(err.to_string().contains("page too large"));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind and drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpPageFetcher::new(&test_config(addr)).unwrap();
        assert!(matches!(
            fetcher.fetch("h1").await,
            Err(NewswireError::Fetch(_))
        ));
    }
}
