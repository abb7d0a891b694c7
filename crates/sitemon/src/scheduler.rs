use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::refresh::Refresher;

/// Shortest interval the scheduler will tick at
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodic driver for [`Refresher`]
///
/// The first refresh starts as soon as the scheduler does; afterwards one
/// refresh is started per interval. A tick that arrives while the previous
/// refresh is still running is skipped.
pub struct Scheduler {
    refresher: Arc<Refresher>,
    interval: Duration,
}

impl Scheduler {
    /// Intervals below [`MIN_INTERVAL`] are raised to it
    pub fn new(refresher: Arc<Refresher>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!(interval_ms = interval.as_millis() as u64, "Refresh interval too short, using minimum");
        }
        Self { refresher, interval: interval.max(MIN_INTERVAL) }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the scheduling loop in the background
    ///
    /// Aborting the returned handle stops the loop and any refresh it started.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = JoinSet::new();

        info!(interval_secs = self.interval.as_secs(), "Refresh scheduler started");

        loop {
            timer.tick().await;

            while let Some(result) = in_flight.try_join_next() {
                if let Err(error) = result {
                    error!(%error, "Refresh task failed");
                }
            }
            if !in_flight.is_empty() {
                info!("Previous refresh still running, skipping tick");
                continue;
            }

            let refresher = Arc::clone(&self.refresher);
            in_flight.spawn(async move { run_once(&refresher).await });
        }
    }
}

async fn run_once(refresher: &Refresher) {
    match refresher.try_refresh().await {
        Some(Ok(_)) => {}
        Some(Err(error)) => error!(%error, "Refresh failed, keeping previous sites"),
        None => info!("Refresh already in progress, skipping tick"),
    }
}
