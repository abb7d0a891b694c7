//! One refresh cycle: fetch the sitemap, probe every site, publish the result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::prober::Probe;
use crate::site::Site;
use crate::sitemap::{SitemapError, SitemapFetcher};
use crate::store::SiteStore;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Sitemap(#[from] SitemapError),
}

/// Limits applied to the probe fan-out of a single refresh
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Maximum number of probes in flight at once
    pub max_concurrency: usize,
    /// Upper bound on the time spent waiting for the whole batch
    pub batch_timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self { max_concurrency: 16, batch_timeout: Duration::from_secs(5 * 60) }
    }
}

/// Outcome of a completed refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// Probes abandoned because the batch deadline passed
    pub timed_out: usize,
    pub elapsed: Duration,
}

/// Runs refresh cycles against a shared store
pub struct Refresher {
    fetcher: SitemapFetcher,
    prober: Arc<dyn Probe>,
    store: Arc<SiteStore>,
    settings: RefreshSettings,
    in_progress: AtomicBool,
}

/// Clears the in-progress flag when a refresh ends or is cancelled
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Refresher {
    pub fn new(
        fetcher: SitemapFetcher,
        prober: Arc<dyn Probe>,
        store: Arc<SiteStore>,
        settings: RefreshSettings,
    ) -> Self {
        Self { fetcher, prober, store, settings, in_progress: AtomicBool::new(false) }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Refresh unless another refresh is already running
    ///
    /// Returns `None` when the call was skipped.
    pub async fn try_refresh(&self) -> Option<Result<RefreshSummary, RefreshError>> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in progress, skipping");
            return None;
        }

        let _in_flight = InFlight(&self.in_progress);
        Some(self.refresh().await)
    }

    /// Fetch, probe and publish
    ///
    /// A sitemap failure leaves the store untouched so the last good result
    /// stays visible.
    pub async fn refresh(&self) -> Result<RefreshSummary, RefreshError> {
        let start = Instant::now();
        info!(sitemap = %self.fetcher.url(), "Refreshing site store");

        let sites = self.fetcher.fetch().await?;
        let (sites, timed_out) = self.probe_all(sites).await;

        let total = sites.len();
        let up = sites.iter().filter(|site| site.up).count();
        let summary = RefreshSummary {
            total,
            up,
            down: total - up,
            timed_out,
            elapsed: start.elapsed(),
        };

        self.store.replace(sites);

        info!(
            total = summary.total,
            up = summary.up,
            down = summary.down,
            timed_out = summary.timed_out,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Site store refreshed"
        );
        Ok(summary)
    }

    /// Probe all sites on a bounded pool, keeping input order
    ///
    /// Sites whose probe panicked or did not finish before the batch deadline
    /// are reported down. Returns the probed sites and the number abandoned.
    async fn probe_all(&self, sites: Vec<Site>) -> (Vec<Site>, usize) {
        let mut results: Vec<Site> = sites.iter().cloned().map(|site| site.with_status(false)).collect();
        let permits = self.settings.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for (index, site) in sites.into_iter().enumerate() {
            let prober = Arc::clone(&self.prober);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // Never closed, so acquiring only waits for a free slot
                let _permit = semaphore.acquire_owned().await.ok();
                (index, prober.check(site).await)
            });
        }

        let deadline = Instant::now() + self.settings.batch_timeout;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, site)))) => results[index] = site,
                Ok(Some(Err(error))) => warn!(%error, "Probe task failed, site reported down"),
                Ok(None) => break,
                Err(_) => {
                    let abandoned = tasks.len();
                    warn!(
                        abandoned,
                        batch_timeout_secs = self.settings.batch_timeout.as_secs(),
                        "Probe batch timed out, unfinished sites reported down"
                    );
                    tasks.abort_all();
                    return (results, abandoned);
                }
            }
        }

        (results, 0)
    }
}
