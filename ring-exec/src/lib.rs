//! # ring-exec
//!
//! Remote execution and run orchestration for ring-mtr.
//!
//! This crate runs the batches built by `ring-core`:
//! - [`RemoteShell`] runs one command on one host ([`SshShell`] shells out to
//!   the system `ssh`, [`MockShell`] is scripted for tests)
//! - [`Executor`] runs a whole batch and returns one [`Outcome`] per
//!   invocation, in invocation order ([`ParallelExecutor`])
//! - [`Orchestrator`] selects nodes, dispatches the inbound and outbound
//!   batches concurrently, and unifies the results
//!
//! ## Architecture
//!
//! ```text
//!                 ┌── execute(inbound)  ── N hosts × 1 command ──┐
//! Orchestrator ───┤        tokio::join!                          ├──► correlate ─► unify
//!                 └── execute(outbound) ── root × N commands ────┘
//! ```
//!
//! [`Outcome`]: ring_types::Outcome

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod orchestrator;
pub mod shell;

pub use executor::{Executor, ParallelExecutor, DEFAULT_RETRY_DELAY};
pub use orchestrator::{Orchestrator, RunError, RunPlan};
pub use shell::{MockShell, RawOutput, RemoteShell, ShellError, ShellRequest, SshShell};
