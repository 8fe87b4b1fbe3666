//! Timer-driven re-rendering of the dashboard.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::fetcher::DataFetcher;

/// Requests a running [`RefreshLoop`] to finish. Cloneable; any clone stops it.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Signal,
    MaxCycles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub cycles: u64,
    pub reason: StopReason,
}

/// Builds a dashboard, hands it to a sink, waits the refresh interval, and
/// repeats until stopped.
///
/// The stop signal is checked before every cycle and also cuts the wait
/// short. A cycle whose fetch failed still waits the full interval. The
/// fetcher's cache TTL should equal the refresh interval.
pub struct RefreshLoop {
    config: DashboardConfig,
    fetcher: Arc<DataFetcher>,
    max_cycles: u64,
    stop: watch::Receiver<bool>,
}

impl RefreshLoop {
    pub fn new(config: DashboardConfig, fetcher: Arc<DataFetcher>) -> (Self, StopHandle) {
        let (tx, stop) = watch::channel(false);
        let refresh = Self {
            config,
            fetcher,
            max_cycles: 0,
            stop,
        };
        (refresh, StopHandle { tx: Arc::new(tx) })
    }

    /// `0` runs until stopped.
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Runs cycles until stopped or `max_cycles` is reached. An error from
    /// `sink` ends the loop and is returned as is.
    pub async fn run<F, E>(mut self, mut sink: F) -> Result<RefreshSummary, E>
    where
        F: FnMut(u64, &Dashboard) -> Result<(), E>,
    {
        let interval = self.config.refresh_interval();
        let mut cycles = 0_u64;
        info!(
            symbol = self.config.symbol_input(),
            period = %self.config.period(),
            interval_secs = interval.as_secs(),
            "starting refresh loop"
        );

        loop {
            if *self.stop.borrow_and_update() {
                info!(cycles, "stop signal received");
                return Ok(RefreshSummary {
                    cycles,
                    reason: StopReason::Signal,
                });
            }

            cycles += 1;
            debug!(iteration = cycles, "refresh cycle started");
            let dashboard = Dashboard::build(&self.config, &self.fetcher).await;
            match &dashboard.error {
                Some(error) => warn!(iteration = cycles, error = %error, "refresh cycle without data"),
                None => info!(
                    iteration = cycles,
                    cache_hit = dashboard.fetch.cache_hit,
                    "refresh cycle rendered"
                ),
            }
            sink(cycles, &dashboard)?;

            if self.max_cycles != 0 && cycles >= self.max_cycles {
                return Ok(RefreshSummary {
                    cycles,
                    reason: StopReason::MaxCycles,
                });
            }

            self.fetcher.cache().clear_expired().await;

            let wait = tokio::time::sleep(interval);
            tokio::pin!(wait);
            tokio::select! {
                _ = &mut wait => {}
                changed = self.stop.changed() => {
                    // Every handle dropped: nobody can stop us early any more.
                    if changed.is_err() {
                        wait.await;
                    }
                }
            }
        }
    }
}
