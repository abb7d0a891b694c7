use std::io::Error as IoError;

use sitemon::{ProbeSetupError, SitemapError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Sitemap setup error: {0}")]
    Sitemap(#[from] SitemapError),
    #[error(transparent)]
    Probe(#[from] ProbeSetupError),
}
