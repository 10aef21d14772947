// Repository traits for traffic count access
use crate::domain::counts::CrossingCounts;
use crate::domain::traffic::TrafficCount;
use async_trait::async_trait;

#[async_trait]
pub trait TrafficRepository: Send + Sync {
    /// Sum of in and out crossings grouped by (location, object_type)
    async fn sum_counts_by_location(&self) -> anyhow::Result<Vec<TrafficCount>>;
}

/// Write side used by the counter recorder
#[async_trait]
pub trait CountStore: Send + Sync {
    /// Create the counts table if it does not exist yet
    async fn ensure_schema(&self) -> anyhow::Result<()>;

    /// Insert a zero row for every class at this location, keeping existing rows
    async fn seed_location(&self, location: &str, classes: &[&str], timestamp: &str) -> anyhow::Result<()>;

    /// Stored tallies for one location
    async fn load_counts(&self, location: &str) -> anyhow::Result<CrossingCounts>;

    /// Persist every tally for one location
    async fn store_counts(&self, location: &str, counts: &CrossingCounts, timestamp: &str) -> anyhow::Result<()>;
}
