//! Ingestion Pipeline Tests
//!
//! End-to-end passes over HTTP against a local preview host, stored in an
//! on-disk database.

mod common;

use common::{ingest_config, spawn_preview_host};
use newswire::news::{IngestionOrchestrator, NewsRepository};
use newswire::Database;
use tempfile::TempDir;

fn http_config(addr: std::net::SocketAddr, sources: &[(&str, &str)]) -> newswire::IngestConfig {
    let mut config = ingest_config(sources);
    config.base_url = format!("http://{}", addr);
    config.timeout_secs = 5;
    config.connect_timeout_secs = 2;
    config
}

#[tokio::test]
async fn test_pass_over_http_persists_new_posts() {
    let addr = spawn_preview_host().await;
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("news.db")).await.unwrap();

    let config = http_config(addr, &[("sport", "sport_h"), ("tver", "tver_h")]);
    let orchestrator = IngestionOrchestrator::from_config(db.clone(), &config).unwrap();

    let summary = orchestrator.run_pass(None).await;
    assert!(summary.success);
    assert_eq!(summary.added, 5);
    assert_eq!(summary.sources[0].added, 3);
    assert_eq!(summary.sources[1].added, 2);
    assert_eq!(summary.sources[1].skipped, 1);

    let repo = NewsRepository::new(db.pool());
    let sport = repo.list_by_category("sport", 50).await.unwrap();
    assert_eq!(sport.len(), 3);
    assert_eq!(sport[0].permalink, "https://t.me/sport_h/3");
    assert_eq!(sport[0].text, "Post number 3");
    assert_eq!(sport[0].display_date, "10:03");
}

#[tokio::test]
async fn test_failing_host_does_not_block_other_sources() {
    let addr = spawn_preview_host().await;
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("news.db")).await.unwrap();

    let config = http_config(
        addr,
        &[("first", "down"), ("sport", "sport_h"), ("history", "missing")],
    );
    let orchestrator = IngestionOrchestrator::from_config(db.clone(), &config).unwrap();

    let summary = orchestrator.run_pass(None).await;
    assert!(summary.success);
    assert_eq!(summary.added, 3);
    assert_eq!(summary.failed_count(), 2);
    assert!(summary.sources[0].error.as_deref().unwrap().contains("503"));
    assert!(summary.sources[2].error.as_deref().unwrap().contains("404"));

    let repo = NewsRepository::new(db.pool());
    assert_eq!(repo.count_by_category("sport").await.unwrap(), 3);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_dedup_survives_reopen() {
    let addr = spawn_preview_host().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("news.db");
    let config = http_config(addr, &[("sport", "sport_h")]);

    {
        let db = Database::open(&path).await.unwrap();
        let orchestrator = IngestionOrchestrator::from_config(db, &config).unwrap();
        assert_eq!(orchestrator.run_pass(None).await.added, 3);
    }

    let db = Database::open(&path).await.unwrap();
    let orchestrator = IngestionOrchestrator::from_config(db.clone(), &config).unwrap();
    let summary = orchestrator.run_pass(None).await;
    assert_eq!(summary.added, 0);
    assert_eq!(summary.sources[0].duplicates, 3);
    assert_eq!(NewsRepository::new(db.pool()).count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_same_posts_under_second_category_are_duplicates() {
    let addr = spawn_preview_host().await;
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("news.db")).await.unwrap();

    // Two categories pointing at one channel: the second sees only known links.
    let config = http_config(addr, &[("sport", "sport_h"), ("first", "sport_h")]);
    let orchestrator = IngestionOrchestrator::from_config(db.clone(), &config).unwrap();

    let summary = orchestrator.run_pass(None).await;
    assert_eq!(summary.added, 3);
    assert_eq!(summary.sources[1].added, 0);
    assert_eq!(summary.sources[1].duplicates, 3);

    let repo = NewsRepository::new(db.pool());
    assert_eq!(repo.count_by_category("first").await.unwrap(), 0);
}
