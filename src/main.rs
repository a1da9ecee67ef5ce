//! resilient-fetch
//!
//! Command-line front end for the resilience helpers.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args ──┐
//!              ├──▶ ResilienceConfig ──▶ RetryPolicy + Deadline
//!   TOML file ─┘                                │
//!                                               ▼
//!                          ┌──────────────────────────────────────┐
//!                          │        retry_with_timeout            │
//!                          │  attempt ─▶ deadline race ─▶ result  │
//!                          │     ▲                          │     │
//!                          │     └── backoff sleep ◀─ fail ─┘     │
//!                          └──────────────────────────────────────┘
//!                                               │
//!                                               ▼
//!                                  probe report (JSON on stdout)
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use resilient_fetch::config::validation::validate_config;
use resilient_fetch::config::{load_config, ConfigError, ResilienceConfig};
use resilient_fetch::observability::{logging, metrics};
use resilient_fetch::probe::{self, ProbeRequest};
use resilient_fetch::resilience::{Deadline, RetryPolicy};

#[derive(Parser)]
#[command(name = "resilient-fetch")]
#[command(about = "Retry REST calls with jittered backoff and per-attempt deadlines", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a URL, retrying failures and slow attempts
    Probe(ProbeArgs),
    /// Print the delay window before each retry
    Schedule(PolicyArgs),
    /// Validate the configuration and print the effective values
    CheckConfig,
}

#[derive(Args)]
struct ProbeArgs {
    /// URL to fetch.
    url: String,

    /// Extra header in name:value form (repeatable).
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    #[command(flatten)]
    policy: PolicyArgs,

    /// Per-attempt deadline in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print Prometheus metrics after the probe.
    #[arg(long)]
    metrics: bool,
}

#[derive(Args)]
struct PolicyArgs {
    /// Maximum number of attempts, the first one included.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Delay before the first retry in milliseconds.
    #[arg(long = "retry-delay-ms", alias = "initial-delay-ms")]
    retry_delay_ms: Option<u64>,
}

impl PolicyArgs {
    fn apply(&self, config: &mut ResilienceConfig) {
        if let Some(max_attempts) = self.max_attempts {
            config.retries.max_attempts = max_attempts;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retries.initial_delay_ms = delay;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ResilienceConfig::default(),
    };

    match &cli.command {
        Commands::Probe(args) => {
            args.policy.apply(&mut config);
            if let Some(timeout_ms) = args.timeout_ms {
                config.timeouts.attempt_timeout_ms = timeout_ms;
            }
            if args.metrics {
                config.observability.metrics_enabled = true;
            }
        }
        Commands::Schedule(args) => args.apply(&mut config),
        Commands::CheckConfig => {}
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::debug!(
        max_attempts = config.retries.max_attempts,
        initial_delay_ms = config.retries.initial_delay_ms,
        attempt_timeout_ms = config.timeouts.attempt_timeout_ms,
        "Configuration loaded"
    );

    tokio::select! {
        result = run(cli.command, config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning in-flight attempt");
            std::process::exit(130);
        }
    }
}

async fn run(command: Commands, config: ResilienceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let policy = RetryPolicy::from(&config.retries);

    match command {
        Commands::Probe(args) => {
            let prometheus = if config.observability.metrics_enabled {
                Some(metrics::install_prometheus()?)
            } else {
                None
            };

            let mut request = ProbeRequest::from_config(&args.url, &config.probe)?;
            for raw in &args.headers {
                request = request.with_raw_header(raw)?;
            }
            let client = probe::build_client(&config.probe)?;
            let deadline = Deadline::from(&config.timeouts);

            let outcome = probe::probe(&client, &request, &policy, &deadline).await;

            if let Some(handle) = prometheus {
                eprintln!("{}", handle.render());
            }

            let report = outcome?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Schedule(_) => {
            let schedule = policy.backoff.schedule(policy.max_attempts);
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
