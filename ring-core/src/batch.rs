//! Construction of the inbound and outbound command batches.
//!
//! The two batches have different shapes:
//! - **inbound**: one invocation per selected node, each connecting to that
//!   node and running mtr towards the root;
//! - **outbound**: one invocation per selected node, all connecting to the
//!   root and running mtr towards that node.
//!
//! Because every outbound invocation targets the same physical host, the
//! outbound batch carries an explicit concurrency cap.

use crate::selector::Selection;
use ring_types::{Direction, IpVersion, NodeId};
use std::time::Duration;

/// Default cap on simultaneous sessions to the root.
pub const DEFAULT_OUTBOUND_CONCURRENCY: usize = 20;

/// Default mtr report cycles.
pub const DEFAULT_CYCLES: u32 = 10;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of connection retries.
pub const DEFAULT_RETRIES: u32 = 1;

/// mtr invocation template shared by every command in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtrCommand {
    /// Forced address family.
    pub ip_version: IpVersion,
    /// Report cycles (`-c`).
    pub cycles: u32,
}

impl MtrCommand {
    /// Render the remote command line for `destination`.
    pub fn render(&self, destination: &str) -> String {
        match self.ip_version.flag() {
            Some(flag) => format!("mtr {} -c {} -w -z -b {}", flag, self.cycles, destination),
            None => format!("mtr -c {} -w -z -b {}", self.cycles, destination),
        }
    }
}

/// A single remote command: where to connect and what to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Host the session connects to.
    pub host: String,
    /// Host mtr probes from there.
    pub destination: String,
}

/// An immutable batch of remote invocations and its execution policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSpec {
    direction: Direction,
    user: String,
    invocations: Vec<Invocation>,
    command: MtrCommand,
    concurrency: Option<usize>,
    connect_timeout: Duration,
    retries: u32,
}

impl BatchSpec {
    /// Inbound or outbound.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Remote login user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Invocations in execution-result order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Number of invocations.
    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    /// True if the batch has nothing to run.
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Command template.
    pub fn command(&self) -> MtrCommand {
        self.command
    }

    /// Remote command line for one invocation.
    pub fn command_for(&self, invocation: &Invocation) -> String {
        self.command.render(&invocation.destination)
    }

    /// Maximum simultaneous sessions, `None` for no cap.
    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }

    /// Per-connection-attempt timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Extra connection attempts after the first one fails.
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// Settings that shape both batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// DNS suffix of ring nodes.
    pub domain: String,
    /// Remote login user.
    pub user: String,
    /// Forced address family.
    pub ip_version: IpVersion,
    /// mtr report cycles.
    pub cycles: u32,
    /// Per-connection-attempt timeout.
    pub connect_timeout: Duration,
    /// Connection retries.
    pub retries: u32,
    /// Cap on simultaneous outbound sessions to the root.
    pub outbound_concurrency: usize,
}

impl BatchOptions {
    /// Options with default cycles, timeout, retries and outbound cap.
    pub fn new(user: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            user: user.into(),
            ip_version: IpVersion::Any,
            cycles: DEFAULT_CYCLES,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            outbound_concurrency: DEFAULT_OUTBOUND_CONCURRENCY,
        }
    }

    fn command(&self) -> MtrCommand {
        MtrCommand {
            ip_version: self.ip_version,
            cycles: self.cycles,
        }
    }
}

/// The two batches of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batches {
    /// Selected nodes towards the root.
    pub inbound: BatchSpec,
    /// Root towards the selected nodes, in selection order.
    pub outbound: BatchSpec,
}

/// Build the inbound and outbound batches for `selection`.
pub fn build_batches(selection: &Selection, root: &NodeId, options: &BatchOptions) -> Batches {
    let root_host = root.fqdn(&options.domain);
    let node_hosts: Vec<String> = selection.iter().map(|n| n.fqdn(&options.domain)).collect();

    let inbound = BatchSpec {
        direction: Direction::Inbound,
        user: options.user.clone(),
        invocations: node_hosts
            .iter()
            .map(|host| Invocation {
                host: host.clone(),
                destination: root_host.clone(),
            })
            .collect(),
        command: options.command(),
        concurrency: None,
        connect_timeout: options.connect_timeout,
        retries: options.retries,
    };

    let outbound = BatchSpec {
        direction: Direction::Outbound,
        user: options.user.clone(),
        invocations: node_hosts
            .into_iter()
            .map(|host| Invocation {
                host: root_host.clone(),
                destination: host,
            })
            .collect(),
        command: options.command(),
        // Semaphore of zero permits would never run anything.
        concurrency: Some(options.outbound_concurrency.max(1)),
        connect_timeout: options.connect_timeout,
        retries: options.retries,
    };

    Batches { inbound, outbound }
}
