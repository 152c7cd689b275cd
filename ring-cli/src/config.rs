//! Command-line, environment and config file handling.
//!
//! Every run setting can come from three places. A flag on the command
//! line wins over its `RING_MTR_*` environment variable (clap handles
//! both), which wins over the `[run]` table of the `--config` file, which
//! wins over the built-in default.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ring_core::{
    BatchOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_CYCLES, DEFAULT_OUTBOUND_CONCURRENCY,
    DEFAULT_RETRIES,
};
use ring_exec::RunPlan;
use ring_types::{ConfigError, IpVersion, NodeId};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default ring domain, used both for the TXT lookup and as node suffix.
pub const DEFAULT_DOMAIN: &str = "ring.nlnog.net";

/// Default number of nodes to sample.
pub const DEFAULT_NUMBER: usize = 10;

/// Perform a MTR towards and from a subset of NLNOG ring nodes.
#[derive(Parser, Debug)]
#[command(name = "ring-mtr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// User to connect to the ring nodes with
    #[arg(short, long, env = "RING_MTR_USER")]
    pub user: Option<String>,

    /// Ring node to/from which all MTRs will be performed
    #[arg(short, long, env = "RING_MTR_ROOT")]
    pub root: Option<String>,

    /// Number of random nodes to run MTRs with [default: 10]
    #[arg(short, long, env = "RING_MTR_NUMBER")]
    pub number: Option<usize>,

    /// Nodes that are always part of the run, in addition to the random ones
    #[arg(
        short,
        long,
        env = "RING_MTR_FORCE",
        value_delimiter = ',',
        num_args = 1..
    )]
    pub force: Vec<String>,

    /// MTR report cycles [default: 10]
    #[arg(
        short,
        long,
        env = "RING_MTR_CYCLES",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub cycles: Option<u32>,

    /// SSH connect timeout in seconds [default: 30]
    #[arg(
        long,
        env = "RING_MTR_CONNECT_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout: Option<u64>,

    /// Number of retries when connecting to the nodes [default: 1]
    #[arg(long, env = "RING_MTR_CONNECT_RETRIES")]
    pub retries: Option<u32>,

    /// Force IPv4 MTRs
    #[arg(
        short = '4',
        long,
        env = "RING_MTR_FORCE_IPV4",
        action = ArgAction::SetTrue,
        value_parser = exactly_true
    )]
    pub ipv4: bool,

    /// Force IPv6 MTRs
    #[arg(
        short = '6',
        long,
        env = "RING_MTR_FORCE_IPV6",
        action = ArgAction::SetTrue,
        value_parser = exactly_true
    )]
    pub ipv6: bool,

    /// Ring domain, used for the node list lookup and as node suffix [default: ring.nlnog.net]
    #[arg(long)]
    pub domain: Option<String>,

    /// Maximum simultaneous MTRs running on the root node [default: 20]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub outbound_concurrency: Option<u32>,

    /// Seed for node sampling, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// TOML config file whose [run] table supplies defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse a `RING_MTR_FORCE_IPV*` value: only `true` enables the flag.
///
/// The flag itself is passed through here as `true` too.
fn exactly_true(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(value == "true")
}

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    /// Run defaults.
    #[serde(default)]
    pub run: RunSection,
}

/// The `[run]` table. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunSection {
    /// Remote login user.
    pub user: Option<String>,
    /// Root node.
    pub root: Option<String>,
    /// Nodes to sample.
    pub number: Option<usize>,
    /// Forced nodes.
    pub force: Option<Vec<String>>,
    /// mtr report cycles.
    pub cycles: Option<u32>,
    /// Connect timeout in seconds.
    pub connect_timeout: Option<u64>,
    /// Connection retries.
    pub retries: Option<u32>,
    /// Force IPv4.
    pub ipv4: Option<bool>,
    /// Force IPv6.
    pub ipv6: Option<bool>,
    /// Ring domain.
    pub domain: Option<String>,
    /// Outbound concurrency cap.
    pub outbound_concurrency: Option<usize>,
}

impl FileConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the file named by `--config`, or an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Remote login user.
    pub user: String,
    /// Root node.
    pub root: NodeId,
    /// Nodes to sample.
    pub number: usize,
    /// Forced nodes.
    pub force: Vec<NodeId>,
    /// mtr report cycles.
    pub cycles: u32,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Connection retries.
    pub retries: u32,
    /// Forced address family.
    pub ip_version: IpVersion,
    /// Ring domain.
    pub domain: String,
    /// Outbound concurrency cap.
    pub outbound_concurrency: usize,
    /// Sampling seed.
    pub seed: Option<u64>,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl Settings {
    /// Merge the command line (and its environment fallbacks) over `file`.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let run = file.run;

        let user = cli.user.clone().or(run.user).ok_or(ConfigError::Missing {
            flag: "user",
            env: "RING_MTR_USER",
        })?;
        let root = cli.root.clone().or(run.root).ok_or(ConfigError::Missing {
            flag: "root",
            env: "RING_MTR_ROOT",
        })?;

        // The file's flags only apply when neither was set above it.
        let (ipv4, ipv6) = if cli.ipv4 || cli.ipv6 {
            (cli.ipv4, cli.ipv6)
        } else {
            (run.ipv4.unwrap_or(false), run.ipv6.unwrap_or(false))
        };
        let ip_version = IpVersion::from_flags(ipv4, ipv6)?;

        let force = if cli.force.is_empty() {
            run.force.unwrap_or_default()
        } else {
            cli.force.clone()
        };

        let cycles = cli.cycles.or(run.cycles).unwrap_or(DEFAULT_CYCLES);
        if cycles == 0 {
            return Err(ConfigError::Invalid {
                setting: "cycles",
                reason: "must be at least 1",
            });
        }

        let connect_timeout = match cli.connect_timeout.or(run.connect_timeout) {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    setting: "connect-timeout",
                    reason: "must be at least 1 second",
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CONNECT_TIMEOUT,
        };

        let outbound_concurrency = cli
            .outbound_concurrency
            .map(|cap| cap as usize)
            .or(run.outbound_concurrency)
            .unwrap_or(DEFAULT_OUTBOUND_CONCURRENCY);
        if outbound_concurrency == 0 {
            return Err(ConfigError::Invalid {
                setting: "outbound-concurrency",
                reason: "must be at least 1",
            });
        }

        Ok(Self {
            user,
            root: NodeId::new(root),
            number: cli.number.or(run.number).unwrap_or(DEFAULT_NUMBER),
            force: force
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(NodeId::new)
                .collect(),
            cycles,
            connect_timeout,
            retries: cli.retries.or(run.retries).unwrap_or(DEFAULT_RETRIES),
            ip_version,
            domain: cli
                .domain
                .clone()
                .or(run.domain)
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            outbound_concurrency,
            seed: cli.seed,
            json: cli.json,
        })
    }

    /// The run plan these settings describe.
    pub fn plan(&self) -> RunPlan {
        RunPlan {
            root: self.root.clone(),
            count: self.number,
            forced: self.force.clone(),
            options: BatchOptions {
                domain: self.domain.clone(),
                user: self.user.clone(),
                ip_version: self.ip_version,
                cycles: self.cycles,
                connect_timeout: self.connect_timeout,
                retries: self.retries,
                outbound_concurrency: self.outbound_concurrency,
            },
        }
    }
}
