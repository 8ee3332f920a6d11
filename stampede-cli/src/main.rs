use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use stampede::burst::burst;
use stampede::http::{notes_projects_templates, Credentials, HttpIssuer};
use stampede::{LoadError, LoadTest, StopSignal};
use std::process::ExitCode;
#[allow(unused)]
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

use cli::{BurstArgs, Cli, Command, RunArgs};

const DEFAULT_LOG_FILTER: &str = "stampede=info";

#[tokio::main]
async fn main() -> ExitCode {
    let loaded = load_env_file();

    let args = Cli::parse();
    init_tracing();

    match loaded {
        Ok(Some(path)) => debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(err) => {
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    }

    match dispatch(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(args: Cli) -> Result<()> {
    if let Some(addr) = args.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .with_context(|| format!("Unable to serve metrics on {addr}"))?;
        info!("Serving metrics on {addr}");
    }

    match args.command {
        Command::Run(run) => run_load_test(run).await,
        Command::Burst(burst) => run_burst(burst).await,
    }
}

/// Load the `.env` file, or the one named by `--env-file`.
///
/// This happens before the real parse so that values in the file feed the `env` fallbacks. A
/// missing default `.env` is fine; a missing explicit file is not.
fn load_env_file() -> Result<Option<std::path::PathBuf>> {
    let explicit = Cli::try_parse().ok().and_then(|cli| cli.env_file);

    match explicit {
        Some(path) => {
            dotenvy::from_path(&path)
                .with_context(|| format!("Unable to load env file {}", path.display()))?;
            Ok(Some(path))
        }
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(err) if err.not_found() => Ok(None),
            Err(err) => Err(err).context("Unable to load .env"),
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    FmtSubscriber::builder().with_env_filter(filter).init();
}

async fn run_load_test(args: RunArgs) -> Result<()> {
    let credentials = Credentials::from_env().context("Unable to read API credentials")?;
    info!("Targeting {}", credentials.base_url());

    let issuer = HttpIssuer::new(
        credentials,
        notes_projects_templates(&args.note_id, &args.project_id, &args.template_id),
    );
    let test = LoadTest::from_config(args.config(), issuer);
    stop_on_ctrl_c(test.stop_signal());

    match test.await {
        Ok(stats) => {
            println!("{stats}");
            Ok(())
        }
        Err(err @ LoadError::Aborted { .. }) => Err(err).context("Load test aborted"),
        Err(err) => Err(err.into()),
    }
}

async fn run_burst(args: BurstArgs) -> Result<()> {
    let client = reqwest::Client::new();
    let report = burst(&client, args.requests, args.method, args.url).await;
    println!("{report}");
    Ok(())
}

fn stop_on_ctrl_c(stop: StopSignal) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted; waiting for in-flight users.");
                stop.fire();
            }
            Err(err) => error!("Unable to listen for Ctrl-C: {err}"),
        }
    });
}
