use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::{serve, tps_measure_task, MockState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_ADDR: &str = "0.0.0.0:3002";
const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8002";
const DEFAULT_TOKEN: &str = "mock-token";
const MAX_TPS: u32 = 500;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    let metrics_addr: SocketAddr = DEFAULT_METRICS_ADDR.parse()?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("Unable to install Prometheus exporter")?;

    let token = std::env::var("TEST_ACCESS_TOKEN").unwrap_or_else(|_| DEFAULT_TOKEN.to_string());
    let state = MockState::new(&token, MAX_TPS);
    tokio::spawn(tps_measure_task(state.clone()));

    let listener = TcpListener::bind(DEFAULT_ADDR)
        .await
        .with_context(|| format!("Unable to bind {DEFAULT_ADDR}"))?;
    serve(listener, state).await?;
    Ok(())
}
