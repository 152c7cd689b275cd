//! Mock remote shell for testing.
//!
//! Allows scripting per-request responses, connection failures and delays,
//! and records every request and the peak number of concurrent runs.

use super::{RawOutput, RemoteShell, ShellError, ShellRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock remote shell for testing.
///
/// Unscripted requests succeed with stdout `"<host>: <command>"`, so tests
/// can tell which request produced which outcome.
#[derive(Debug, Default)]
pub struct MockShell {
    inner: Arc<Mutex<MockShellInner>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct MockShellInner {
    /// Responses keyed by (host, command).
    responses: HashMap<(String, String), RawOutput>,
    /// Hosts whose connections always fail, with the failure message.
    unreachable: HashMap<String, String>,
    /// Remaining forced connection failures per host.
    fail_next: HashMap<String, u32>,
    /// Delay per (host, command).
    delays: HashMap<(String, String), Duration>,
    /// Delay for requests without a specific one.
    default_delay: Duration,
    /// Every request received, in arrival order.
    requests: Vec<ShellRequest>,
}

impl MockShell {
    /// Create a new mock shell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` for `command` on `host`.
    pub fn respond(&self, host: &str, command: &str, output: RawOutput) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .insert((host.to_string(), command.to_string()), output);
    }

    /// Make every connection to `host` fail with `message`.
    pub fn unreachable(&self, host: &str, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .unreachable
            .insert(host.to_string(), message.to_string());
    }

    /// Make the next `times` connections to `host` fail.
    pub fn fail_next_connects(&self, host: &str, times: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next.insert(host.to_string(), times);
    }

    /// Delay the response to `command` on `host`.
    pub fn delay(&self, host: &str, command: &str, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .delays
            .insert((host.to_string(), command.to_string()), delay);
    }

    /// Delay every response without a specific delay.
    pub fn default_delay(&self, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.default_delay = delay;
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ShellRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Number of requests received for `host`.
    pub fn attempts(&self, host: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.requests.iter().filter(|r| r.host == host).count()
    }

    /// Highest number of requests that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Clear all state (scripts, requests, counters).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockShellInner::default();
        self.in_flight.store(0, Ordering::SeqCst);
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    /// Record the request and decide its result without holding the lock
    /// across the delay.
    fn plan(&self, request: &ShellRequest) -> (Duration, Result<RawOutput, ShellError>) {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.clone());

        let key = (request.host.clone(), request.command.clone());
        let delay = inner
            .delays
            .get(&key)
            .copied()
            .unwrap_or(inner.default_delay);

        if let Some(message) = inner.unreachable.get(&request.host) {
            return (
                delay,
                Err(ShellError::Connection {
                    host: request.host.clone(),
                    message: message.clone(),
                }),
            );
        }

        if let Some(remaining) = inner.fail_next.get_mut(&request.host) {
            if *remaining > 0 {
                *remaining -= 1;
                return (
                    delay,
                    Err(ShellError::Connection {
                        host: request.host.clone(),
                        message: "Connection timed out".to_string(),
                    }),
                );
            }
        }

        let output = inner.responses.get(&key).cloned().unwrap_or_else(|| {
            RawOutput::success(format!("{}: {}\n", request.host, request.command))
        });
        (delay, Ok(output))
    }
}

impl Clone for MockShell {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
        }
    }
}

#[async_trait]
impl RemoteShell for MockShell {
    async fn run(&self, request: &ShellRequest) -> Result<RawOutput, ShellError> {
        let (delay, result) = self.plan(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
