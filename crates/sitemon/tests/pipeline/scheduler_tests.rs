//! Scheduler tests

use std::sync::Arc;
use std::time::Duration;

use sitemon::{RefreshSettings, Scheduler, scheduler};
use wiremock::MockServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    SITEMAP_PATH, ScriptedProbe, fetcher_for, refresher, serve_sitemap, sitemap_requests, sitemap_xml,
};

#[tokio::test]
async fn test_first_refresh_runs_immediately() {
    let server = MockServer::start().await;
    let url = format!("{}/up", server.uri());
    serve_sitemap(&server, sitemap_xml(&[url.as_str()])).await;

    let (refresher, store) =
        refresher(fetcher_for(&server), Arc::new(ScriptedProbe::default()), RefreshSettings::default());
    let handle = Scheduler::new(refresher, Duration::from_secs(3600)).start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.abort();

    let sites = store.read();
    assert_eq!(sites.len(), 1);
    assert!(sites[0].up);
}

#[tokio::test]
async fn test_refreshes_on_every_interval() {
    let server = MockServer::start().await;
    serve_sitemap(&server, sitemap_xml(&[format!("{}/up", server.uri())])).await;

    let (refresher, _store) =
        refresher(fetcher_for(&server), Arc::new(ScriptedProbe::default()), RefreshSettings::default());
    let handle = Scheduler::new(refresher, Duration::from_millis(100)).start();

    tokio::time::sleep(Duration::from_millis(450)).await;
    handle.abort();

    assert!(sitemap_requests(&server).await >= 3);
}

#[tokio::test]
async fn test_overlapping_ticks_are_skipped() {
    let server = MockServer::start().await;
    serve_sitemap(&server, sitemap_xml(&[format!("{}/slow", server.uri())])).await;

    let prober = Arc::new(ScriptedProbe::with_delay(Duration::from_secs(2)));
    let (refresher, _store) = refresher(fetcher_for(&server), prober, RefreshSettings::default());
    let handle = Scheduler::new(Arc::clone(&refresher), Duration::from_millis(100)).start();

    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(refresher.is_refreshing());
    handle.abort();

    assert_eq!(sitemap_requests(&server).await, 1);
}

#[tokio::test]
async fn test_failed_refresh_keeps_ticking() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SITEMAP_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (refresher, store) =
        refresher(fetcher_for(&server), Arc::new(ScriptedProbe::default()), RefreshSettings::default());
    let handle = Scheduler::new(refresher, Duration::from_millis(100)).start();

    tokio::time::sleep(Duration::from_millis(450)).await;
    assert!(!handle.is_finished());
    handle.abort();

    assert!(sitemap_requests(&server).await >= 3);
    assert!(store.read().is_empty());
    assert!(store.snapshot().refreshed_at.is_none());
}

#[tokio::test]
async fn test_zero_interval_is_raised_to_minimum() {
    let server = MockServer::start().await;
    serve_sitemap(&server, sitemap_xml(&[format!("{}/up", server.uri())])).await;

    let (refresher, store) =
        refresher(fetcher_for(&server), Arc::new(ScriptedProbe::default()), RefreshSettings::default());
    let scheduler = Scheduler::new(refresher, Duration::ZERO);
    assert_eq!(scheduler.interval(), scheduler::MIN_INTERVAL);

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!handle.is_finished());
    handle.abort();

    assert_eq!(store.read().len(), 1);
}

#[tokio::test]
async fn test_oversized_concurrency_refreshes_on_schedule() {
    let server = MockServer::start().await;
    serve_sitemap(&server, sitemap_xml(&[format!("{}/up", server.uri())])).await;

    let settings = RefreshSettings { max_concurrency: usize::MAX, ..RefreshSettings::default() };
    let (refresher, store) = refresher(fetcher_for(&server), Arc::new(ScriptedProbe::default()), settings);
    let handle = Scheduler::new(refresher, Duration::from_secs(3600)).start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.abort();

    assert!(store.snapshot().refreshed_at.is_some());
    assert!(store.read()[0].up);
}
