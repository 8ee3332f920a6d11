use clap::{Args, Parser, Subcommand};
use stampede::LoadTestConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_NOTE_ID: &str = "652f9ad5d769854a8c558d97";
const DEFAULT_PROJECT_ID: &str = "64ddf79ab40bc5668f46b46d";
const DEFAULT_TEMPLATE_ID: &str = "652fe87c1bcf5f9e5674d7e0";

#[derive(Parser, Debug)]
#[command(name = "stampede", version, about = "Virtual-user load generator")]
pub struct Cli {
    /// Environment file loaded before anything else (default `.env`, if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this address while running
    #[arg(long, global = true, env = "STAMPEDE_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive virtual users against the API until the duration elapses
    Run(RunArgs),

    /// Fire a single batch of concurrent requests at one URL
    Burst(BurstArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name used in logs and metric labels
    #[arg(long, default_value = "notes", env = "STAMPEDE_NAME")]
    pub name: String,

    /// Number of concurrent virtual users
    #[arg(short, long, default_value_t = stampede::DEFAULT_USERS, env = "STAMPEDE_USERS")]
    pub users: usize,

    /// How long users keep starting new units of work (e.g. `30s`, `2m`)
    #[arg(short, long, default_value = "30s", value_parser = humantime::parse_duration, env = "STAMPEDE_DURATION")]
    pub duration: Duration,

    /// Maximum think-time before each unit of work
    #[arg(short, long, default_value = "1000ms", value_parser = humantime::parse_duration, env = "STAMPEDE_PACING")]
    pub pacing: Duration,

    /// How long to wait for in-flight users after the deadline
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration, env = "STAMPEDE_GRACE")]
    pub grace: Duration,

    /// Seed the pacers for a reproducible run
    #[arg(long, env = "STAMPEDE_SEED")]
    pub seed: Option<u64>,

    #[arg(long, default_value = DEFAULT_NOTE_ID, env = "TEST_NOTE_ID")]
    pub note_id: String,

    #[arg(long, default_value = DEFAULT_PROJECT_ID, env = "TEST_PROJECT_ID")]
    pub project_id: String,

    #[arg(long, default_value = DEFAULT_TEMPLATE_ID, env = "TEST_TEMPLATE_ID")]
    pub template_id: String,
}

impl RunArgs {
    pub fn config(&self) -> LoadTestConfig {
        let mut config = LoadTestConfig::new(&self.name);
        config.users = self.users;
        config.duration = self.duration;
        config.pacing = self.pacing;
        config.grace_period = Some(self.grace);
        config.seed = self.seed;
        config
    }
}

#[derive(Args, Debug)]
pub struct BurstArgs {
    /// Number of concurrent requests
    #[arg(short = 'n', long, default_value_t = 100)]
    pub requests: usize,

    /// HTTP method to use
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: reqwest::Method,

    pub url: Url,
}
