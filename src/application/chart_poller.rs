// Chart poller - Keeps the latest chart series fresh on a timer and on demand
use crate::domain::chart::ChartSeries;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Where the poller gets its series from
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch_series(&self) -> anyhow::Result<Vec<ChartSeries>>;
}

/// Displayed chart state. `token` is the request token of the fetch that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSnapshot {
    pub token: u64,
    pub series: Vec<ChartSeries>,
}

pub struct ChartPoller {
    source: Arc<dyn SeriesSource>,
    period: Duration,
}

impl ChartPoller {
    pub fn new(source: Arc<dyn SeriesSource>, period: Duration) -> Self {
        Self { source, period }
    }

    /// Spawn the polling loop. The first fetch happens immediately.
    pub fn start(self) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(ChartSnapshot::default());
        let (refresh_tx, refresh_rx) = mpsc::channel(16);

        let driver = tokio::spawn(drive(
            self.source,
            self.period,
            Arc::new(state_tx),
            refresh_rx,
        ));

        PollerHandle {
            refresh_tx,
            state: state_rx,
            driver,
        }
    }
}

/// Owner of a running poller. Dropping it stops the timer; fetches already
/// in flight still run to completion.
pub struct PollerHandle {
    refresh_tx: mpsc::Sender<()>,
    state: watch::Receiver<ChartSnapshot>,
    driver: JoinHandle<()>,
}

impl PollerHandle {
    pub fn subscribe(&self) -> watch::Receiver<ChartSnapshot> {
        self.state.clone()
    }

    pub fn current(&self) -> ChartSnapshot {
        self.state.borrow().clone()
    }

    /// Request an out-of-band fetch
    pub async fn refresh(&self) -> anyhow::Result<()> {
        self.refresh_tx
            .send(())
            .await
            .map_err(|_| anyhow::anyhow!("chart poller is not running"))
    }

    pub fn shutdown(self) {
        self.driver.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    source: Arc<dyn SeriesSource>,
    period: Duration,
    state: Arc<watch::Sender<ChartSnapshot>>,
    mut refresh_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut next_token: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::trace!("Periodic chart refresh");
            }
            trigger = refresh_rx.recv() => {
                if trigger.is_none() {
                    break;
                }
                tracing::debug!("Manual chart refresh");
            }
        }

        next_token += 1;
        let token = next_token;
        let source = source.clone();
        let state = state.clone();

        // Fetches are not serialized; ordering is restored by the token check
        tokio::spawn(async move {
            match source.fetch_series().await {
                Ok(series) => {
                    if !apply_if_newer(&state, token, series) {
                        tracing::debug!("Discarding stale chart response {}", token);
                    }
                }
                Err(e) => {
                    tracing::warn!("Chart refresh {} failed: {:#}", token, e);
                }
            }
        });
    }
}

/// Replace the displayed series unless a newer request already landed
pub fn apply_if_newer(
    state: &watch::Sender<ChartSnapshot>,
    token: u64,
    series: Vec<ChartSeries>,
) -> bool {
    state.send_if_modified(|current| {
        if token <= current.token {
            return false;
        }
        current.token = token;
        current.series = series;
        true
    })
}
