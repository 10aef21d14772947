use crate::domain::chart::DEFAULT_SERIES_COLOR;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub recorder: RecorderSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://traffic_monitor_data.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartSettings {
    pub color: String,
    pub endpoint: String,
    pub refresh_interval_secs: u64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            color: DEFAULT_SERIES_COLOR.to_string(),
            endpoint: "http://127.0.0.1:8080/api/data".to_string(),
            refresh_interval_secs: 10,
        }
    }
}

impl ChartSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RecorderSettings {
    pub location: String,
    pub flush_interval_secs: u64,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            location: "default".to_string(),
            flush_interval_secs: 10,
        }
    }
}

impl RecorderSettings {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

/// Load settings from an optional file, then `TRAFFIC__SECTION__KEY` environment variables
pub fn load_config(path: Option<&Path>) -> anyhow::Result<DashboardConfig> {
    build_config(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("TRAFFIC")
        .separator("__")
        .try_parsing(true)
}

fn build_config(path: Option<&Path>, env: config::Environment) -> anyhow::Result<DashboardConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    let settings = builder.add_source(env).build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();

        assert_eq!(config.database.url, "sqlite://traffic_monitor_data.db");
        assert_eq!(config.chart.color, DEFAULT_SERIES_COLOR);
        assert_eq!(config.chart.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.recorder.flush_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config(Some(Path::new("does/not/exist.toml"))).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_file_overrides_some_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[database]\nurl = \"sqlite::memory:\"\n\n[chart]\nrefresh_interval_secs = 3\n"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.chart.refresh_interval(), Duration::from_secs(3));
        assert_eq!(config.chart.color, DEFAULT_SERIES_COLOR);
        assert_eq!(config.recorder.location, "default");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[chart]\nendpoint = \"http://file:8080/api/data\"\nrefresh_interval_secs = 3\n").unwrap();

        let mut vars = config::Map::new();
        vars.insert("TRAFFIC__CHART__ENDPOINT".to_string(), "http://env:9090/api/data".to_string());
        vars.insert("TRAFFIC__RECORDER__FLUSH_INTERVAL_SECS".to_string(), "30".to_string());
        vars.insert("OTHER__CHART__COLOR".to_string(), "black".to_string());

        let config = build_config(Some(file.path()), environment().source(Some(vars))).unwrap();

        assert_eq!(config.chart.endpoint, "http://env:9090/api/data");
        assert_eq!(config.chart.refresh_interval(), Duration::from_secs(3));
        assert_eq!(config.recorder.flush_interval(), Duration::from_secs(30));
        assert_eq!(config.chart.color, DEFAULT_SERIES_COLOR);
    }

    #[test]
    fn test_zero_refresh_interval_is_clamped() {
        let chart = ChartSettings {
            refresh_interval_secs: 0,
            ..ChartSettings::default()
        };
        assert_eq!(chart.refresh_interval(), Duration::from_secs(1));
    }
}
