//! Sitemon - sitemap-driven liveness monitoring
//!
//! This library fetches a sitemap, probes every listed URL concurrently and
//! publishes the outcome to a shared [`SiteStore`] that a web front end reads.

pub mod prober;
pub mod refresh;
pub mod scheduler;
pub mod site;
pub mod sitemap;
pub mod store;

// Re-export main types
pub use prober::{HttpProber, Probe, ProbeSetupError};
pub use refresh::{RefreshError, RefreshSettings, RefreshSummary, Refresher};
pub use scheduler::Scheduler;
pub use site::Site;
pub use sitemap::{ParseError, SitemapError, SitemapFetcher, parse_sitemap};
pub use store::{SiteStore, Snapshot};

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!("sitemon/", env!("CARGO_PKG_VERSION"));

/// Default timeout for a single liveness probe
pub const DEFAULT_PROBE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Default period between two scheduled refreshes
pub const DEFAULT_REFRESH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30 * 60);
