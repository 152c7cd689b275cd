//! Remote shell abstraction for ring-mtr.
//!
//! A [`RemoteShell`] runs a single command on a single host, once. It does
//! not retry and does not know about batches; [`crate::ParallelExecutor`]
//! owns fan-out and retries.
//!
//! # Design
//!
//! - A command that ran returns [`RawOutput`], whatever its exit code
//! - A command that could not be run (spawn failure, connection failure)
//!   returns a [`ShellError`]
//!
//! # Example
//!
//! ```ignore
//! let shell = SshShell::new();
//! let output = shell.run(&request).await?;
//! println!("{}", output.stdout);
//! ```

mod mock;
mod ssh;

pub use mock::MockShell;
pub use ssh::SshShell;

use async_trait::async_trait;
use ring_types::Outcome;
use std::time::Duration;
use thiserror::Error;

/// Shell errors. All of them mean the command never ran.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Local process could not be started.
    #[error("spawn error: {0}")]
    Spawn(#[from] std::io::Error),

    /// Connection or authentication to the remote host failed.
    #[error("connection to {host} failed: {message}")]
    Connection {
        /// Target host.
        host: String,
        /// Transport's own description of the failure.
        message: String,
    },
}

/// One command to run on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// Remote login user.
    pub user: String,
    /// Host to connect to.
    pub host: String,
    /// Command line to run there.
    pub command: String,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
}

/// Output of a command that ran on the remote host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code, `None` if the remote command was killed by a signal.
    pub exit_code: Option<i32>,
}

impl RawOutput {
    /// Successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Convert into an [`Outcome`] for `host`, splitting streams into lines.
    ///
    /// A command without an exit status (killed by a signal) counts as a
    /// transport failure; its partial output is discarded.
    pub fn into_outcome(self, host: &str) -> Outcome {
        match self.exit_code {
            Some(code) => Outcome::completed(
                host,
                split_lines(&self.stdout),
                split_lines(&self.stderr),
                code,
            ),
            None => Outcome::failed(host, "remote command terminated without an exit status"),
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Runs one command on one remote host.
///
/// Implementations handle the underlying transport (system ssh, mock, etc).
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run `request.command` on `request.host`, once.
    async fn run(&self, request: &ShellRequest) -> Result<RawOutput, ShellError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_outcome_splits_lines() {
        let raw = RawOutput {
            stdout: "HOST: a\n  1.|-- gw\n".to_string(),
            stderr: "warn\n".to_string(),
            exit_code: Some(0),
        };
        let outcome = raw.into_outcome("a.example");
        assert_eq!(outcome.host, "a.example");
        assert_eq!(outcome.stdout, vec!["HOST: a", "  1.|-- gw"]);
        assert_eq!(outcome.stderr, vec!["warn"]);
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn empty_streams_become_empty_vecs() {
        let outcome = RawOutput::success("").into_outcome("a.example");
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.is_empty());
    }

    #[test]
    fn missing_exit_status_is_a_transport_failure() {
        let raw = RawOutput {
            stdout: "partial\n".to_string(),
            stderr: String::new(),
            exit_code: None,
        };
        let outcome = raw.into_outcome("a.example");
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.is_empty());
        assert_eq!(outcome.exit_code, None);
        assert_eq!(
            outcome.error.as_deref(),
            Some("remote command terminated without an exit status")
        );
    }

    #[test]
    fn connection_error_display() {
        let err = ShellError::Connection {
            host: "a.example".into(),
            message: "Connection timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "connection to a.example failed: Connection timed out"
        );
    }
}
