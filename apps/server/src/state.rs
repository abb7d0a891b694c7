use std::path::PathBuf;
use std::sync::Arc;

use sitemon::SiteStore;

/// Shared data handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<SiteStore>,
    /// Status page template, read on every request
    pub home_template: PathBuf,
}
