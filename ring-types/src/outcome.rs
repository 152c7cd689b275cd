//! Per-invocation outcomes and the unified per-node report.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// Result of one remote invocation.
///
/// Exactly one is produced per invocation in a batch. `stdout` and `stderr`
/// are always present (possibly empty). A transport failure sets `error`
/// and leaves both streams empty with no exit code; a command that ran
/// carries its exit code, whatever it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Host the invocation connected to.
    pub host: String,
    /// Standard output, one entry per line.
    pub stdout: Vec<String>,
    /// Standard error, one entry per line.
    pub stderr: Vec<String>,
    /// Remote exit code, if the command ran to completion.
    pub exit_code: Option<i32>,
    /// Transport-level failure, if the command could not be run.
    pub error: Option<String>,
}

impl Outcome {
    /// Outcome of a command that ran on `host`.
    pub fn completed(
        host: impl Into<String>,
        stdout: Vec<String>,
        stderr: Vec<String>,
        exit_code: i32,
    ) -> Self {
        Self {
            host: host.into(),
            stdout,
            stderr,
            exit_code: Some(exit_code),
            error: None,
        }
    }

    /// Outcome of an invocation that never got to run the command.
    pub fn failed(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
            error: Some(error.into()),
        }
    }

    /// True if the command ran and exited with status 0.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.exit_code == Some(0)
    }

    /// Non-zero exit code, if the command ran and failed.
    pub fn failed_exit_code(&self) -> Option<i32> {
        self.exit_code.filter(|code| *code != 0)
    }
}

/// Unified inbound + outbound result for one selected node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    /// The selected node.
    pub node: NodeId,
    /// mtr run on `node` towards the root.
    pub inbound: Outcome,
    /// mtr run on the root towards `node`.
    pub outbound: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_has_empty_streams() {
        let outcome = Outcome::failed("a.example", "connection refused");
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.is_empty());
        assert_eq!(outcome.exit_code, None);
        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_exit_code(), None);
    }

    #[test]
    fn nonzero_exit_keeps_data() {
        let outcome = Outcome::completed(
            "a.example",
            vec!["HOST: a".into()],
            vec!["ping: unreachable".into()],
            1,
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_exit_code(), Some(1));
        assert_eq!(outcome.stdout, vec!["HOST: a".to_string()]);
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn zero_exit_is_success() {
        let outcome = Outcome::completed("a.example", vec![], vec![], 0);
        assert!(outcome.is_success());
        assert_eq!(outcome.failed_exit_code(), None);
    }
}
