// Main entry point - Dependency injection and command dispatch
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing_subscriber::EnvFilter;

use crate::application::chart_poller::ChartPoller;
use crate::application::chart_service::ChartService;
use crate::application::count_recorder::CountRecorder;
use crate::domain::counts::TRACKED_CLASSES;
use crate::infrastructure::config::{load_config, DashboardConfig};
use crate::infrastructure::http_source::HttpSeriesSource;
use crate::infrastructure::sqlite_repository::SqliteRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;
use crate::presentation::terminal_chart::render_chart;

const DASHBOARD_TITLE: &str = "Traffic Monitor Dashboard";

#[derive(Parser, Debug)]
#[clap(version, about = "Traffic count dashboard")]
struct AppArgs {
    /// Settings file; missing files fall back to defaults
    #[clap(long, global = true, default_value = "config/dashboard.toml")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard page and the chart data API
    Serve,
    /// Poll the chart data API and draw it in the terminal; Enter refreshes
    Watch {
        /// Override the configured endpoint
        #[clap(long)]
        endpoint: Option<String>,
    },
    /// Read crossing events as JSON lines from stdin and persist the tallies
    Record {
        /// Override the configured location name
        #[clap(long)]
        location: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = AppArgs::parse();
    let config = load_config(Some(args.config.as_path()))?;
    tracing::debug!("Loaded configuration: {:?}", config);

    match args.command {
        Command::Serve => serve(config).await,
        Command::Watch { endpoint } => watch(config, endpoint).await,
        Command::Record { location } => record(config, location).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("traffic_dashboard=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .init();
}

async fn serve(config: DashboardConfig) -> anyhow::Result<()> {
    // Create repository (infrastructure layer)
    let repository = Arc::new(SqliteRepository::connect(&config.database.url, true)?);

    // Create services (application layer)
    let chart_service = ChartService::new(repository, config.chart.color.clone());
    let state = Arc::new(AppState { chart_service });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting traffic dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn watch(config: DashboardConfig, endpoint: Option<String>) -> anyhow::Result<()> {
    let period = config.chart.refresh_interval();
    let endpoint = endpoint.unwrap_or(config.chart.endpoint);
    tracing::info!("Polling {} every {:?}", endpoint, period);

    let source = Arc::new(HttpSeriesSource::new(endpoint));
    let handle = ChartPoller::new(source, period).start();
    let mut snapshots = handle.subscribe();
    let mut keys = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!("{}", render_chart(DASHBOARD_TITLE, &snapshot.series));
            }
            key = keys.next(), if stdin_open => {
                match key {
                    Some(Ok(_)) => handle.refresh().await?,
                    // keep polling on the timer only
                    Some(Err(_)) | None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Stopped after refresh {}", handle.current().token);
    handle.shutdown();
    Ok(())
}

async fn record(config: DashboardConfig, location: Option<String>) -> anyhow::Result<()> {
    let location = location.unwrap_or(config.recorder.location.clone());
    let store = Arc::new(SqliteRepository::connect(&config.database.url, false)?);
    let mut recorder = CountRecorder::start(store, location, config.recorder.flush_interval()).await?;

    let recorded = recorder
        .record_lines(BufReader::new(tokio::io::stdin()))
        .await?;
    tracing::info!("Input closed after {} events", recorded);
    for object_type in TRACKED_CLASSES {
        if let Some(counts) = recorder.counts().get(object_type) {
            tracing::info!("{}: {} in, {} out", object_type, counts.in_count, counts.out_count);
        }
    }
    Ok(())
}
