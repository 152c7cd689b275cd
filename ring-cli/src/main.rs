//! # ring-mtr
//!
//! Run MTRs towards and from a subset of NLNOG RING nodes.
//!
//! A root node is measured against a random sample of ring nodes, plus any
//! nodes forced onto the run. For each selected node two MTRs are run over
//! ssh: one on the node towards the root (inbound) and one on the root
//! towards the node (outbound).
//!
//! ## Example
//!
//! ```bash
//! # 10 random nodes against nlnog01, as user "ops"
//! ring-mtr --user ops --root nlnog01
//!
//! # 5 random nodes plus two forced ones, IPv6 only
//! ring-mtr -u ops -r nlnog01 -n 5 -f coloclue01,bit01 -6
//!
//! # Same selection every time, JSON output
//! RING_MTR_USER=ops RING_MTR_ROOT=nlnog01 ring-mtr --seed 42 --json
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ring_exec::{Orchestrator, ParallelExecutor, SshShell};
use ring_types::ConfigError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod dns;
mod render;

use config::{Cli, FileConfig, Settings};
use dns::DigSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = match Settings::resolve(&cli, file) {
        Ok(settings) => settings,
        Err(e) => usage_error(e),
    };

    tokio::select! {
        result = run(settings) => result,
        _ = shutdown_signal() => {
            tracing::info!("Received SIGTERM, exiting.");
            std::process::exit(0);
        }
    }
}

/// Print `err` with the usage line and exit.
fn usage_error(err: ConfigError) -> ! {
    let kind = match err {
        ConfigError::Missing { .. } => ErrorKind::MissingRequiredArgument,
        ConfigError::ConflictingIpVersions => ErrorKind::ArgumentConflict,
        ConfigError::Invalid { .. } => ErrorKind::ValueValidation,
    };
    Cli::command().error(kind, err).exit()
}

async fn run(settings: Settings) -> Result<()> {
    let catalog = dns::fetch_catalog(&DigSource::new(), &settings.domain).await?;

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let plan = settings.plan();
    let orchestrator = Orchestrator::new(ParallelExecutor::new(SshShell::new()));
    let reports = orchestrator
        .select_and_run(&plan, &catalog, &mut rng)
        .await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if settings.json {
        render::render_json(&mut out, &reports).context("Failed to write report")?;
    } else {
        render::render_text(&mut out, &reports, &plan.root, &settings.domain)
            .context("Failed to write report")?;
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
