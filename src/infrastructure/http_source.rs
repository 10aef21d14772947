// HTTP client for the chart data endpoint
use crate::application::chart_poller::SeriesSource;
use crate::domain::chart::ChartSeries;
use anyhow::{Context, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HttpSeriesSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSeriesSource {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl SeriesSource for HttpSeriesSource {
    async fn fetch_series(&self) -> Result<Vec<ChartSeries>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chart data request failed with status {}: {}", status, body);
        }

        response
            .json::<Vec<ChartSeries>>()
            .await
            .context("Failed to parse chart data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_service::ChartService;
    use crate::application::traffic_repository::TrafficRepository;
    use crate::domain::traffic::TrafficCount;
    use crate::presentation::app_state::AppState;
    use crate::presentation::router::build_router;
    use std::sync::Arc;

    struct StaticRepository {
        fail: bool,
    }

    #[async_trait]
    impl TrafficRepository for StaticRepository {
        async fn sum_counts_by_location(&self) -> Result<Vec<TrafficCount>> {
            if self.fail {
                anyhow::bail!("unable to open database file");
            }
            Ok(vec![
                TrafficCount::new("A", "car", 5),
                TrafficCount::new("B", "bus", 1),
            ])
        }
    }

    async fn serve(fail: bool) -> String {
        let state = Arc::new(AppState {
            chart_service: ChartService::new(Arc::new(StaticRepository { fail }), "green".to_string()),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{}/api/data", addr)
    }

    #[tokio::test]
    async fn test_fetches_series_from_endpoint() {
        let source = HttpSeriesSource::new(serve(false).await);

        let series = source.fetch_series().await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].id, "A");
        assert_eq!(series[0].color, "green");
        assert_eq!(series[1].data[0].x, "bus");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let source = HttpSeriesSource::new(serve(true).await);

        let err = source.fetch_series().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
