// Count recorder - Tallies line crossings for one location and persists them periodically
use crate::application::traffic_repository::CountStore;
use crate::domain::counts::{CrossingCounts, CrossingEvent, TRACKED_CLASSES};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::{wrappers::LinesStream, StreamExt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub struct CountRecorder {
    store: Arc<dyn CountStore>,
    location: String,
    counts: CrossingCounts,
    flush_interval: Duration,
    last_flush: Instant,
}

impl CountRecorder {
    /// Prepare the table, seed this location and resume from the stored tallies
    pub async fn start(
        store: Arc<dyn CountStore>,
        location: String,
        flush_interval: Duration,
    ) -> anyhow::Result<Self> {
        store.ensure_schema().await?;
        store
            .seed_location(&location, &TRACKED_CLASSES, &current_timestamp())
            .await
            .with_context(|| format!("Failed to seed counts for {}", location))?;
        let counts = store.load_counts(&location).await?;

        tracing::info!("Recording crossings for location {}", location);
        Ok(Self {
            store,
            location,
            counts,
            flush_interval,
            last_flush: Instant::now(),
        })
    }

    pub fn counts(&self) -> &CrossingCounts {
        &self.counts
    }

    /// Count one event; persists when the flush interval has passed. Returns whether it flushed.
    pub async fn record(&mut self, event: &CrossingEvent) -> anyhow::Result<bool> {
        self.record_at(event, Instant::now()).await
    }

    pub async fn record_at(&mut self, event: &CrossingEvent, now: Instant) -> anyhow::Result<bool> {
        let applied = self.counts.apply(event);
        if applied == 0 && !(event.entered.is_empty() && event.exited.is_empty()) {
            tracing::debug!("Ignoring event with no tracked classes: {:?}", event);
        }

        if now.saturating_duration_since(self.last_flush) >= self.flush_interval {
            self.flush().await?;
            self.last_flush = now;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume JSON-line crossing events until end of input, then flush once more.
    /// Blank and malformed lines are skipped. Returns the number of events recorded.
    pub async fn record_lines<R>(&mut self, reader: R) -> anyhow::Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut recorded = 0;
        let mut lines = LinesStream::new(reader.lines());
        while let Some(line) = lines.next().await {
            let line = line.context("Failed to read crossing events")?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CrossingEvent>(&line) {
                Ok(event) => {
                    self.record(&event).await?;
                    recorded += 1;
                }
                Err(e) => tracing::warn!("Skipping malformed event {:?}: {}", line, e),
            }
        }

        self.flush().await?;
        Ok(recorded)
    }

    pub async fn flush(&mut self) -> anyhow::Result<()> {
        self.store
            .store_counts(&self.location, &self.counts, &current_timestamp())
            .await
            .with_context(|| format!("Failed to store counts for {}", self.location))?;
        tracing::debug!("Flushed counts for {}", self.location);
        Ok(())
    }
}
