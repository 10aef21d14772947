// SQLite repository implementation
use crate::application::traffic_repository::{CountStore, TrafficRepository};
use crate::domain::counts::{ClassCounts, CrossingCounts};
use crate::domain::traffic::TrafficCount;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const SUM_BY_LOCATION: &str = "
    SELECT location, object_type, SUM(in_count + out_count) AS count
    FROM traffic_counts
    GROUP BY location, object_type
";

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS traffic_counts (
        location TEXT,
        object_type TEXT,
        in_count INTEGER,
        out_count INTEGER,
        last_updated TEXT,
        PRIMARY KEY (location, object_type)
    )
";

#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Prepare a pool for the database. Connections open on first use, so a
    /// missing file surfaces as a query error. A read-only repository never
    /// creates the file.
    pub fn connect(url: &str, read_only: bool) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {}", url))?
            .create_if_missing(!read_only)
            .read_only(read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrafficRepository for SqliteRepository {
    async fn sum_counts_by_location(&self) -> Result<Vec<TrafficCount>> {
        let rows = sqlx::query_as::<_, TrafficCount>(SUM_BY_LOCATION)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query traffic counts")?;

        tracing::debug!("Grouping query returned {} rows", rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl CountStore for SqliteRepository {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .context("Failed to create traffic_counts table")?;
        Ok(())
    }

    async fn seed_location(&self, location: &str, classes: &[&str], timestamp: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for object_type in classes {
            sqlx::query(
                "INSERT OR IGNORE INTO traffic_counts (location, in_count, out_count, object_type, last_updated)
                 VALUES (?, 0, 0, ?, ?)",
            )
            .bind(location)
            .bind(*object_type)
            .bind(timestamp)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn load_counts(&self, location: &str) -> Result<CrossingCounts> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            "SELECT object_type, in_count, out_count FROM traffic_counts WHERE location = ?",
        )
        .bind(location)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load counts for {}", location))?;

        let mut counts = CrossingCounts::new();
        for (object_type, in_count, out_count) in rows {
            counts.set(&object_type, ClassCounts { in_count, out_count });
        }
        Ok(counts)
    }

    async fn store_counts(&self, location: &str, counts: &CrossingCounts, timestamp: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (object_type, c) in counts.iter() {
            sqlx::query(
                "UPDATE traffic_counts
                 SET in_count = ?, out_count = ?, last_updated = ?
                 WHERE object_type = ? AND location = ?",
            )
            .bind(c.in_count)
            .bind(c.out_count)
            .bind(timestamp)
            .bind(object_type)
            .bind(location)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
