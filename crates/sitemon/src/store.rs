//! Shared, atomically replaced collection of probed sites.
//!
//! The store holds one complete sequence at a time. Writers swap the whole
//! sequence, readers clone a pointer to it, so nobody ever sees a half-written
//! list. The lock is only held for the pointer swap or clone.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::site::Site;

/// Point-in-time view of the store
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub sites: Arc<[Site]>,
    /// When the sites were last replaced, `None` before the first refresh
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self { sites: Arc::from(Vec::new()), refreshed_at: None }
    }

    /// Number of sites whose last probe succeeded
    pub fn up_count(&self) -> usize {
        self.sites.iter().filter(|site| site.up).count()
    }
}

/// Thread-safe holder of the current site list
#[derive(Debug)]
pub struct SiteStore {
    inner: Mutex<Snapshot>,
}

impl Default for SiteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { inner: Mutex::new(Snapshot::empty()) }
    }

    /// Current sites, in the order they were stored
    pub fn read(&self) -> Arc<[Site]> {
        Arc::clone(&self.lock().sites)
    }

    /// Current sites together with the time they were stored
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Swap in a new site list as a whole
    pub fn replace(&self, sites: Vec<Site>) {
        let sites: Arc<[Site]> = Arc::from(sites);
        let mut inner = self.lock();
        inner.sites = sites;
        inner.refreshed_at = Some(Utc::now());
    }

    // The snapshot is only ever assigned whole, so a poisoned lock still
    // guards a complete value.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
