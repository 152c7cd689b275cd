//! Batch execution.
//!
//! [`Executor::execute`] is the boundary between orchestration and the
//! remote transport. Its contract:
//! - exactly one [`Outcome`] per invocation, in invocation order;
//! - a failing invocation never aborts the rest of the batch;
//! - at most `concurrency` invocations run at once when the batch is capped.
//!
//! Correlation of outbound results relies on the ordering guarantee, so
//! [`ParallelExecutor`] awaits its tasks in spawn order rather than in
//! completion order.

use crate::shell::{RemoteShell, ShellRequest};
use async_trait::async_trait;
use ring_core::BatchSpec;
use ring_types::Outcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Pause between connection attempts to the same host.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Runs a batch of remote invocations.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run every invocation of `batch`, returning outcomes in invocation order.
    async fn execute(&self, batch: &BatchSpec) -> Vec<Outcome>;
}

/// Executor that runs each invocation as its own task on a [`RemoteShell`].
///
/// Each invocation is independent: no connection is shared between
/// invocations, even when they target the same host.
#[derive(Debug)]
pub struct ParallelExecutor<S> {
    shell: Arc<S>,
    retry_delay: Duration,
}

impl<S: RemoteShell + 'static> ParallelExecutor<S> {
    /// Create an executor over `shell`.
    pub fn new(shell: S) -> Self {
        Self {
            shell: Arc::new(shell),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the pause between connection attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

#[async_trait]
impl<S: RemoteShell + 'static> Executor for ParallelExecutor<S> {
    async fn execute(&self, batch: &BatchSpec) -> Vec<Outcome> {
        let semaphore = batch.concurrency().map(|cap| Arc::new(Semaphore::new(cap)));
        tracing::debug!(
            "Dispatching {} {} invocations (cap: {:?})",
            batch.len(),
            batch.direction(),
            batch.concurrency()
        );

        let mut handles = Vec::with_capacity(batch.len());
        for invocation in batch.invocations() {
            let request = ShellRequest {
                user: batch.user().to_string(),
                host: invocation.host.clone(),
                command: batch.command_for(invocation),
                connect_timeout: batch.connect_timeout(),
            };
            let shell = Arc::clone(&self.shell);
            let semaphore = semaphore.clone();
            let retries = batch.retries();
            let retry_delay = self.retry_delay;

            let handle = tokio::spawn(async move {
                // Hold permit until done
                let _permit = match semaphore {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(e) => return Outcome::failed(&request.host, e.to_string()),
                    },
                    None => None,
                };
                run_with_retries(shell.as_ref(), &request, retries, retry_delay).await
            });
            handles.push((invocation.host.clone(), handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (host, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Invocation task for {} failed: {}", host, e);
                    outcomes.push(Outcome::failed(host, format!("task failed: {}", e)));
                }
            }
        }

        outcomes
    }
}

/// Run `request`, retrying connection failures up to `retries` times.
async fn run_with_retries<S: RemoteShell + ?Sized>(
    shell: &S,
    request: &ShellRequest,
    retries: u32,
    retry_delay: Duration,
) -> Outcome {
    let mut attempt = 0;
    loop {
        match shell.run(request).await {
            Ok(output) => return output.into_outcome(&request.host),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::debug!(
                    "Connection to {} failed, retry {}/{}: {}",
                    request.host,
                    attempt,
                    retries,
                    e
                );
                if !retry_delay.is_zero() {
                    tokio::time::sleep(retry_delay).await;
                }
            }
            Err(e) => {
                tracing::warn!("Giving up on {}: {}", request.host, e);
                return Outcome::failed(&request.host, e.to_string());
            }
        }
    }
}
