//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sitemon::{Probe, RefreshSettings, Refresher, Site, SiteStore, SitemapFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SITEMAP_PATH: &str = "/sitemap.xml";

/// Render a minimal `urlset` document
pub fn sitemap_xml<S: AsRef<str>>(urls: &[S]) -> String {
    let entries: String = urls
        .iter()
        .map(|url| format!("  <url><loc>{}</loc></url>\n", url.as_ref()))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>\n"
    )
}

/// Serve `body` as the sitemap of `server`
pub async fn serve_sitemap(server: &MockServer, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(SITEMAP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.into()))
        .mount(server)
        .await;
}

/// Answer `route` with `status` after `delay`
pub async fn serve_page(server: &MockServer, route: &str, status: u16, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(server)
        .await;
}

pub fn fetcher_for(server: &MockServer) -> SitemapFetcher {
    SitemapFetcher::new(format!("{}{SITEMAP_PATH}", server.uri()), Duration::from_secs(5))
        .expect("sitemap client should build")
}

pub fn refresher(
    fetcher: SitemapFetcher,
    prober: Arc<dyn Probe>,
    settings: RefreshSettings,
) -> (Arc<Refresher>, Arc<SiteStore>) {
    let store = Arc::new(SiteStore::new());
    let refresher = Arc::new(Refresher::new(fetcher, prober, Arc::clone(&store), settings));
    (refresher, store)
}

/// Number of sitemap downloads `server` has seen
pub async fn sitemap_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == SITEMAP_PATH)
        .count()
}

/// Probe whose behaviour is chosen by the last path segment of the URL
///
/// `up` and `down` answer at once, `slow` answers up after `delay`, `hang`
/// never answers and `panic` panics. Tracks the highest number of probes
/// running at the same time.
#[derive(Default)]
pub struct ScriptedProbe {
    pub delay: Duration,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedProbe {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Probe for ScriptedProbe {
    async fn check(&self, site: Site) -> Site {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        let up = match site.url.rsplit('/').next().unwrap_or_default() {
            "up" => true,
            "slow" => {
                tokio::time::sleep(self.delay).await;
                true
            }
            "hang" => std::future::pending().await,
            "panic" => panic!("probe exploded for {}", site.url),
            _ => false,
        };

        self.running.fetch_sub(1, Ordering::SeqCst);
        site.with_status(up)
    }
}
