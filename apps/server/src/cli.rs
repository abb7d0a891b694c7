use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

/// Sitemap liveness status page
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/sitemon/config.toml)
    #[arg(short, long, env = "SITEMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sitemap to read the monitored URLs from
    #[arg(long, env = "SITEMON_SITEMAP_URL")]
    pub sitemap_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "SITEMON_BIND")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SITEMON_PORT")]
    pub port: Option<u16>,

    /// Seconds between two refreshes
    #[arg(long, env = "SITEMON_REFRESH_INTERVAL", value_name = "SECONDS")]
    pub refresh_interval: Option<u64>,

    /// Seconds before a single probe is considered down
    #[arg(long, env = "SITEMON_PROBE_TIMEOUT", value_name = "SECONDS")]
    pub probe_timeout: Option<u64>,

    /// Seconds a whole probe batch may take
    #[arg(long, env = "SITEMON_BATCH_TIMEOUT", value_name = "SECONDS")]
    pub batch_timeout: Option<u64>,

    /// Maximum number of probes in flight
    #[arg(long, env = "SITEMON_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// HTML template used for the status page
    #[arg(long, env = "SITEMON_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Print the resolved configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Load the configuration file, apply overrides and validate the result
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let mut config = Config::from_config(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.sitemap_url {
            config.sitemap.url.clone_from(url);
        }
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(interval) = self.refresh_interval {
            config.refresh.interval_seconds = interval;
        }
        if let Some(timeout) = self.probe_timeout {
            config.refresh.probe_timeout_seconds = timeout;
        }
        if let Some(timeout) = self.batch_timeout {
            config.refresh.batch_timeout_seconds = timeout;
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.refresh.max_concurrency = max_concurrency;
        }
        if let Some(template) = &self.template {
            config.templates.home.clone_from(template);
        }
    }
}
