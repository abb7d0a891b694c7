//! HTTP prober tests

use std::time::Duration;

use sitemon::{HttpProber, Probe, Site};
use wiremock::MockServer;

use crate::common::serve_page;

fn prober() -> HttpProber {
    HttpProber::new(Duration::from_millis(500)).expect("probe client should build")
}

#[tokio::test]
async fn test_ok_response_is_up() {
    let server = MockServer::start().await;
    serve_page(&server, "/ok", 200, Duration::ZERO).await;

    let site = prober().check(Site::new(format!("{}/ok", server.uri()))).await;
    assert!(site.up);
}

#[tokio::test]
async fn test_other_success_status_is_up() {
    let server = MockServer::start().await;
    serve_page(&server, "/created", 204, Duration::ZERO).await;

    let site = prober().check(Site::new(format!("{}/created", server.uri()))).await;
    assert!(site.up);
}

#[tokio::test]
async fn test_error_status_is_down() {
    let server = MockServer::start().await;
    serve_page(&server, "/missing", 404, Duration::ZERO).await;
    serve_page(&server, "/broken", 500, Duration::ZERO).await;

    let prober = prober();
    for route in ["/missing", "/broken"] {
        let site = prober.check(Site::new(format!("{}{route}", server.uri())).with_status(true)).await;
        assert!(!site.up, "{route} should be reported down");
    }
}

#[tokio::test]
async fn test_slow_response_is_down() {
    let server = MockServer::start().await;
    serve_page(&server, "/slow", 200, Duration::from_secs(3)).await;

    let site = prober().check(Site::new(format!("{}/slow", server.uri()))).await;
    assert!(!site.up);
}

#[tokio::test]
async fn test_probe_keeps_url() {
    let server = MockServer::start().await;
    serve_page(&server, "/ok", 200, Duration::ZERO).await;
    let url = format!("{}/ok", server.uri());

    let site = prober().check(Site::new(url.clone())).await;
    assert_eq!(site.url, url);
}
