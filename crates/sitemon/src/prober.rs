use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::site::Site;

/// Failure to build the HTTP client behind a prober
#[derive(Debug, Error)]
#[error("failed to build probe client: {0}")]
pub struct ProbeSetupError(#[from] reqwest::Error);

/// Liveness check for a single site
///
/// Implementations never fail: the outcome is reported through [`Site::up`].
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, site: Site) -> Site;
}

/// Probes a site with an HTTP GET and treats any 2xx answer as up
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, ProbeSetupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Probe for HttpProber {
    async fn check(&self, site: Site) -> Site {
        let start = Instant::now();

        let response = match self.client.get(&site.url).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!(url = %site.url, %error, "Probe failed before a response arrived");
                return site.with_status(false);
            }
        };

        let status = response.status();
        debug!(
            url = %site.url,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Probe completed"
        );

        site.with_status(status.is_success())
    }
}
