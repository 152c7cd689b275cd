//! SSH remote shell.
//!
//! Uses `tokio::process::Command` to shell out to `ssh`. Authentication is
//! left to the user's agent and ssh config; `BatchMode` makes ssh fail
//! instead of prompting.

use super::{RawOutput, RemoteShell, ShellError, ShellRequest};
use async_trait::async_trait;
use std::process::Stdio;

/// Exit status ssh reserves for its own failures (connect, auth, ...).
const SSH_FAILURE_STATUS: i32 = 255;

/// Remote shell backed by the system `ssh` binary.
#[derive(Debug, Clone)]
pub struct SshShell {
    program: String,
    options: Vec<String>,
}

impl Default for SshShell {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            options: vec![
                "BatchMode=yes".to_string(),
                "StrictHostKeyChecking=accept-new".to_string(),
            ],
        }
    }
}

impl SshShell {
    /// Create a shell using `ssh` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different ssh binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Add an extra `-o` option, e.g. `IdentityFile=~/.ssh/ring`.
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Full ssh argument list for `request`.
    fn args(&self, request: &ShellRequest) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() * 2 + 7);
        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        args.push("-o".to_string());
        args.push(format!(
            "ConnectTimeout={}",
            request.connect_timeout.as_secs().max(1)
        ));
        args.push("-l".to_string());
        args.push(request.user.clone());
        args.push(request.host.clone());
        args.push(request.command.clone());
        args
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&self, request: &ShellRequest) -> Result<RawOutput, ShellError> {
        let output = tokio::process::Command::new(&self.program)
            .args(self.args(request))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        match output.status.code() {
            Some(SSH_FAILURE_STATUS) => Err(ShellError::Connection {
                host: request.host.clone(),
                message: stderr.trim().to_string(),
            }),
            exit_code => Ok(RawOutput {
                stdout,
                stderr,
                exit_code,
            }),
        }
    }
}
