use serde::{Deserialize, Serialize};

/// A single URL taken from the sitemap and its last known liveness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Location as listed in the sitemap `loc` element
    pub url: String,

    /// Outcome of the most recent probe, `false` until one has completed
    pub up: bool,
}

impl Site {
    /// Create a site that has not been probed yet
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), up: false }
    }

    /// Record the outcome of a probe
    pub fn with_status(mut self, up: bool) -> Self {
        self.up = up;
        self
    }
}
