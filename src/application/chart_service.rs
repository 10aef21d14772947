// Chart service - Use case for building the per-location chart series
use crate::application::traffic_repository::TrafficRepository;
use crate::domain::chart::{duplicate_pairs, fold_into_series, ChartSeries};
use std::sync::Arc;

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn TrafficRepository>,
    series_color: String,
}

impl ChartService {
    pub fn new(repository: Arc<dyn TrafficRepository>, series_color: String) -> Self {
        Self {
            repository,
            series_color,
        }
    }

    pub async fn get_series(&self) -> anyhow::Result<Vec<ChartSeries>> {
        let rows = self.repository.sum_counts_by_location().await?;

        for (location, object_type) in duplicate_pairs(&rows) {
            tracing::warn!(
                "Grouping query returned {}/{} more than once",
                location,
                object_type
            );
        }

        let series = fold_into_series(rows, &self.series_color);
        tracing::debug!("Built {} chart series", series.len());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traffic::TrafficCount;
    use async_trait::async_trait;

    struct FixedRepository(Vec<TrafficCount>);

    #[async_trait]
    impl TrafficRepository for FixedRepository {
        async fn sum_counts_by_location(&self) -> anyhow::Result<Vec<TrafficCount>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRepository;

    #[async_trait]
    impl TrafficRepository for BrokenRepository {
        async fn sum_counts_by_location(&self) -> anyhow::Result<Vec<TrafficCount>> {
            anyhow::bail!("database is locked")
        }
    }

    #[tokio::test]
    async fn test_get_series_reshapes_rows() {
        let repo = FixedRepository(vec![
            TrafficCount::new("Main St", "car", 12),
            TrafficCount::new("Main St", "bus", 1),
            TrafficCount::new("Harbor", "person", 30),
        ]);
        let service = ChartService::new(Arc::new(repo), "blue".to_string());

        let series = service.get_series().await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].id, "Main St");
        assert_eq!(series[0].color, "blue");
        assert_eq!(series[0].data.len(), 2);
        assert_eq!(series[1].id, "Harbor");
    }

    #[tokio::test]
    async fn test_get_series_propagates_query_failure() {
        let service = ChartService::new(Arc::new(BrokenRepository), "blue".to_string());

        let err = service.get_series().await.unwrap_err();
        assert!(err.to_string().contains("database is locked"));
    }

    #[tokio::test]
    async fn test_get_series_empty_store() {
        let service = ChartService::new(Arc::new(FixedRepository(Vec::new())), "blue".to_string());
        assert!(service.get_series().await.unwrap().is_empty());
    }
}
